use std::collections::VecDeque;
use std::path::PathBuf;

use gtk4::gio;
use gtk4::prelude::*;

/// Ordered clip queue for one agent reply. Clips play strictly in sequence on
/// the single shared media stream; the queue only hands out the next URL.
#[derive(Debug, Default)]
pub struct Playlist {
    queue: VecDeque<String>,
}

impl Playlist {
    /// Replace the queue with the clips of a new reply.
    pub fn load(&mut self, urls: Vec<String>) {
        self.queue = urls.into();
    }

    /// Take the next clip to play, if any.
    pub fn next(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Point the shared media stream at `url` and start playback. The stream is
/// reused across turns; its source is overwritten per clip.
pub fn play_clip(media: &gtk4::MediaFile, url: &str) {
    log::info!("Playing clip {url}");
    media.set_file(Some(&gio::File::for_uri(url)));
    media.play();
}

/// Stop playback and drop the current source.
pub fn stop(media: &gtk4::MediaFile) {
    media.set_playing(false);
    media.set_file(None::<&gio::File>);
}

/// Local spoken-fallback clip, if the user installed one:
/// ~/.local/share/voice-chat/fallback_im_trouble.mp3
fn fallback_clip_path() -> Option<PathBuf> {
    let mut p = dirs::data_dir()?;
    p.push("voice-chat");
    p.push("fallback_im_trouble.mp3");
    p.exists().then_some(p)
}

/// Play the local fallback phrase. Returns false when no clip is installed;
/// the caller falls back to a synthesized tone.
pub fn play_fallback(media: &gtk4::MediaFile) -> bool {
    match fallback_clip_path() {
        Some(path) => {
            log::info!("Playing fallback clip {}", path.display());
            media.set_file(Some(&gio::File::for_path(&path)));
            media.play();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_come_out_in_load_order() {
        let mut playlist = Playlist::default();
        playlist.load(vec!["a.mp3".into(), "b.mp3".into()]);
        assert_eq!(playlist.next().as_deref(), Some("a.mp3"));
        assert_eq!(playlist.next().as_deref(), Some("b.mp3"));
        assert_eq!(playlist.next(), None);
        // Drained queue stays empty; completion can only be reported once.
        assert_eq!(playlist.next(), None);
    }

    #[test]
    fn load_replaces_previous_queue() {
        let mut playlist = Playlist::default();
        playlist.load(vec!["old.mp3".into()]);
        playlist.load(vec!["new.mp3".into()]);
        assert_eq!(playlist.next().as_deref(), Some("new.mp3"));
        assert_eq!(playlist.next(), None);
    }

    #[test]
    fn clear_empties_the_queue() {
        let mut playlist = Playlist::default();
        playlist.load(vec!["a.mp3".into(), "b.mp3".into()]);
        playlist.clear();
        assert_eq!(playlist.next(), None);
    }
}
