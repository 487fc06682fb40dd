use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::AppState;
use crate::config::ProviderSettings;

const PERSONAS: [&str; 4] = ["neutral", "friendly", "formal", "pirate"];

/// Show the provider settings dialog. Saving persists the settings locally and
/// pushes them to `POST /config/{sessionId}`; the result is shown inline.
/// Entirely separate from the recording state machine.
pub fn show_config_dialog(
    parent: &libadwaita::ApplicationWindow,
    state: &Rc<RefCell<AppState>>,
) {
    let window = libadwaita::Window::builder()
        .title("Provider Settings")
        .default_width(420)
        .default_height(520)
        .transient_for(parent)
        .modal(true)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    toolbar_view.add_top_bar(&libadwaita::HeaderBar::new());

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    let current = state.borrow().config.providers.clone();

    let keys_group = libadwaita::PreferencesGroup::new();
    keys_group.set_title("API Keys");

    let murf_row = password_row("Murf (TTS)", &current.murf);
    let aai_row = password_row("AssemblyAI (STT)", &current.aai);
    let gemini_row = password_row("Gemini (LLM)", &current.gemini);
    let weather_row = password_row("OpenWeatherMap", &current.weather);
    let search_row = password_row("Web Search", &current.search);
    for row in [&murf_row, &aai_row, &gemini_row, &weather_row, &search_row] {
        keys_group.add(row);
    }
    content.append(&keys_group);

    let persona_group = libadwaita::PreferencesGroup::new();
    persona_group.set_title("Persona");
    persona_group.set_margin_top(12);

    let persona_row = libadwaita::ComboRow::builder()
        .title("Assistant persona")
        .model(&gtk4::StringList::new(&PERSONAS))
        .build();
    let selected = PERSONAS
        .iter()
        .position(|p| *p == current.persona)
        .unwrap_or(0);
    persona_row.set_selected(selected as u32);
    persona_group.add(&persona_row);
    content.append(&persona_group);

    let save_button = gtk4::Button::builder()
        .label("Save")
        .halign(gtk4::Align::Center)
        .margin_top(16)
        .build();
    save_button.add_css_class("pill");
    save_button.add_css_class("suggested-action");
    content.append(&save_button);

    let save_status = gtk4::Label::new(None);
    save_status.add_css_class("dim-label");
    save_status.set_margin_top(8);
    save_status.set_visible(false);
    content.append(&save_status);

    {
        let state = state.clone();
        let save_status = save_status.clone();
        save_button.connect_clicked(move |_| {
            let settings = ProviderSettings {
                murf: murf_row.text().trim().to_string(),
                aai: aai_row.text().trim().to_string(),
                gemini: gemini_row.text().trim().to_string(),
                weather: weather_row.text().trim().to_string(),
                search: search_row.text().trim().to_string(),
                persona: PERSONAS[persona_row.selected() as usize].to_string(),
            };

            // Persist locally, then push to the server for this session
            let (client, session_id) = {
                let mut s = state.borrow_mut();
                s.config.providers = settings.clone();
                if let Err(e) = s.config.save() {
                    log::warn!("Failed to save config: {e}");
                }
                (s.client.clone(), s.session_id.clone())
            };

            save_status.set_text("Saving…");
            save_status.remove_css_class("error");
            save_status.set_visible(true);

            let (tx, rx) = async_channel::bounded::<Result<(), String>>(1);
            state.borrow().tokio_rt.spawn(async move {
                let _ = tx.send(client.save_config(&session_id, &settings).await).await;
            });

            let save_status = save_status.clone();
            gtk4::glib::spawn_future_local(async move {
                if let Ok(result) = rx.recv().await {
                    match result {
                        Ok(()) => {
                            save_status.set_text("✅ Saved");
                            save_status.remove_css_class("error");
                        }
                        Err(msg) => {
                            log::warn!("Config push failed: {msg}");
                            save_status.set_text(&format!("❌ {msg}"));
                            save_status.add_css_class("error");
                        }
                    }
                }
            });
        });
    }

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));
    window.present();
}

fn password_row(title: &str, text: &str) -> libadwaita::PasswordEntryRow {
    libadwaita::PasswordEntryRow::builder()
        .title(title)
        .text(text)
        .build()
}
