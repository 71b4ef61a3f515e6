use anyhow::Result;

mod app;
mod client;
mod config;
mod conversation;
mod handler;
mod tui;
mod ui;

use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let app = App::new(&config.resolve_backend_url());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, app).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, mut app: App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }

        app.poll_backend().await;
    }

    Ok(())
}
