mod app;
mod audio_feedback;
mod client;
mod config;
mod player;
mod recorder;
mod session;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppState, BackendEvent};

fn main() {
    env_logger::init();
    log::info!("Voice Chat starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.voicechat")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Create async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    // Build app state
    let state = Rc::new(RefCell::new(AppState::new(backend_tx.clone())));
    log::info!("Session {}", state.borrow().session_id);

    // Build UI
    let widgets = ui::chat::build_chat_window(
        app,
        "Ready to start",
        state.borrow().config.web_search,
    );

    // Wire up the record toggle
    {
        let sender = backend_tx.clone();
        widgets.record_button.connect_clicked(move |_| {
            let _ = sender.try_send(BackendEvent::RecordToggled);
        });
    }

    // Wire up session reset
    {
        let sender = backend_tx.clone();
        widgets.reset_button.connect_clicked(move |_| {
            let _ = sender.try_send(BackendEvent::SessionReset);
        });
    }

    // Wire up the settings dialog
    {
        let state_clone = state.clone();
        let window = widgets.window.clone();
        widgets.config_button.connect_clicked(move |_| {
            ui::config_dialog::show_config_dialog(&window, &state_clone);
        });
    }

    // Persist web-search flag changes
    {
        let state_clone = state.clone();
        widgets.web_search_row.connect_active_notify(move |row| {
            let mut s = state_clone.borrow_mut();
            s.config.web_search = row.is_active();
            if let Err(e) = s.config.save() {
                log::warn!("Failed to save config: {e}");
            }
        });
    }

    // Clip completion and playback errors feed the state machine
    {
        let sender = backend_tx.clone();
        widgets.media.connect_ended_notify(move |media| {
            if media.is_ended() {
                let _ = sender.try_send(BackendEvent::ClipEnded);
            }
        });
    }
    {
        let sender = backend_tx.clone();
        widgets.media.connect_error_notify(move |media| {
            if let Some(err) = media.error() {
                let _ = sender.try_send(BackendEvent::PlaybackFailed(err.to_string()));
            }
        });
    }

    // Store UI handles in state and show the window
    {
        let mut s = state.borrow_mut();
        s.widgets = Some(widgets);
    }
    state.borrow().widgets.as_ref().unwrap().window.present();

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}
