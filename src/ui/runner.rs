//! Terminal setup and the main render loop.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::ui::clock::FrameClock;
use crate::ui::scene::Services;
use crate::ui::stack::NavigationStack;

pub async fn run(stack: &mut NavigationStack, services: &Services) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, stack, services).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    stack: &mut NavigationStack,
    services: &Services,
) -> Result<()> {
    let mut clock = FrameClock::new();

    loop {
        let frame_start = std::time::Instant::now();

        // Process all pending events first for minimal input latency
        let mut should_quit = false;
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };

            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                should_quit = true;
                break;
            }

            // Esc is the global back key; whichever scene armed the
            // dispatcher decides what it means.
            let action = if key.code == KeyCode::Esc {
                if stack.in_transition() {
                    None
                } else {
                    services.back.borrow_mut().dispatch()
                }
            } else {
                stack.handle_key(key)
            };

            if let Some(action) = action {
                if stack.apply(action) {
                    should_quit = true;
                    break;
                }
            }
        }

        if should_quit {
            break;
        }

        // Surface tracking edges to scene listeners on the main thread
        services.tracker.pump();

        // Advance the in-flight transition by one frame
        let dt = clock.tick();
        stack.tick(dt);

        terminal.draw(|frame| {
            stack.render(frame, frame.area());
        })?;

        // Sleep for remainder of 16ms frame (60 FPS)
        let elapsed = frame_start.elapsed();
        if let Some(remaining) = Duration::from_millis(16).checked_sub(elapsed) {
            tokio::time::sleep(remaining).await;
        }
    }

    Ok(())
}
