use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::client::ChatMessage;

/// Handles returned from building the chat window.
pub struct ChatWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub record_button: gtk4::Button,
    pub status_label: gtk4::Label,
    pub chat_list: gtk4::ListBox,
    pub llm_group: libadwaita::PreferencesGroup,
    pub llm_label: gtk4::Label,
    pub web_search_row: libadwaita::SwitchRow,
    pub reset_button: gtk4::Button,
    pub config_button: gtk4::Button,
    /// Single playback stream, reused across turns.
    pub media: gtk4::MediaFile,
}

impl ChatWidgets {
    /// Single source of truth for user-visible progress text.
    pub fn set_status(&self, text: &str, is_error: bool) {
        self.status_label.set_text(text);
        if is_error {
            self.status_label.add_css_class("error");
            self.status_label.remove_css_class("dim-label");
        } else {
            self.status_label.remove_css_class("error");
            self.status_label.add_css_class("dim-label");
        }
    }

    /// Flip the record toggle between its idle and recording affordances.
    pub fn set_recording(&self, recording: bool) {
        if recording {
            self.record_button.set_label("Stop Recording");
            self.record_button.add_css_class("destructive-action");
            self.record_button.remove_css_class("suggested-action");
        } else {
            self.record_button.set_label("Start Recording");
            self.record_button.add_css_class("suggested-action");
            self.record_button.remove_css_class("destructive-action");
        }
    }

    /// Replace the rendered transcript with the server's canonical history.
    pub fn render_history(&self, history: &[ChatMessage]) {
        while let Some(child) = self.chat_list.first_child() {
            self.chat_list.remove(&child);
        }
        for message in history {
            let emoji = if message.role == "user" { "🧑" } else { "🤖" };
            let label = gtk4::Label::new(Some(&format!(
                "{emoji} {}: {}",
                message.role, message.content
            )));
            label.set_wrap(true);
            label.set_xalign(0.0);
            label.set_margin_top(4);
            label.set_margin_bottom(4);
            label.set_margin_start(8);
            label.set_margin_end(8);
            label.add_css_class(if message.role == "user" {
                "chat-user"
            } else {
                "chat-assistant"
            });
            self.chat_list.append(&label);
        }
    }

    /// Show the assistant reply text, or hide the panel when cleared.
    pub fn set_llm_text(&self, text: Option<&str>) {
        match text {
            Some(text) => {
                self.llm_label.set_text(text);
                self.llm_group.set_visible(true);
            }
            None => {
                self.llm_label.set_text("");
                self.llm_group.set_visible(false);
            }
        }
    }
}

/// Build the main chat window.
pub fn build_chat_window(
    app: &libadwaita::Application,
    initial_status: &str,
    web_search: bool,
) -> ChatWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Voice Chat")
        .default_width(460)
        .default_height(620)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let reset_button = gtk4::Button::from_icon_name("view-refresh-symbolic");
    reset_button.set_tooltip_text(Some("Reset session"));
    header.pack_start(&reset_button);

    let config_button = gtk4::Button::from_icon_name("emblem-system-symbolic");
    config_button.set_tooltip_text(Some("Provider settings"));
    header.pack_end(&config_button);

    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Record toggle + status line ---
    let record_button = gtk4::Button::builder()
        .label("Start Recording")
        .halign(gtk4::Align::Center)
        .build();
    record_button.add_css_class("pill");
    record_button.add_css_class("suggested-action");
    content.append(&record_button);

    let status_label = gtk4::Label::new(Some(initial_status));
    status_label.add_css_class("dim-label");
    status_label.set_margin_top(8);
    content.append(&status_label);

    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

    // --- Conversation transcript ---
    let chat_group = libadwaita::PreferencesGroup::new();
    chat_group.set_title("Conversation");
    chat_group.set_margin_top(12);

    let chat_list = gtk4::ListBox::new();
    chat_list.set_selection_mode(gtk4::SelectionMode::None);
    chat_list.add_css_class("boxed-list");

    let chat_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .min_content_height(240)
        .vexpand(true)
        .child(&chat_list)
        .build();
    chat_group.add(&chat_scroll);
    content.append(&chat_group);

    // --- Assistant reply text (hidden until the first reply) ---
    let llm_group = libadwaita::PreferencesGroup::new();
    llm_group.set_title("Assistant");
    llm_group.set_margin_top(12);
    llm_group.set_visible(false);

    let llm_label = gtk4::Label::new(None);
    llm_label.set_wrap(true);
    llm_label.set_xalign(0.0);
    llm_label.set_selectable(true);
    llm_group.add(&llm_label);
    content.append(&llm_group);

    // --- Options ---
    let options_group = libadwaita::PreferencesGroup::new();
    options_group.set_title("Options");
    options_group.set_margin_top(12);

    let web_search_row = libadwaita::SwitchRow::builder()
        .title("Web search")
        .subtitle("Let the agent search the web for answers")
        .active(web_search)
        .build();
    options_group.add(&web_search_row);
    content.append(&options_group);

    // Assemble
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));

    ChatWidgets {
        window,
        record_button,
        status_label,
        chat_list,
        llm_group,
        llm_label,
        web_search_row,
        reset_button,
        config_button,
        media: gtk4::MediaFile::new(),
    }
}
