use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, BackendEvent};

/// Upload the encoded turn to the agent endpoint on the tokio runtime.
pub fn dispatch_agent_call(state: &Rc<RefCell<AppState>>, wav: Vec<u8>) {
    let s = state.borrow();
    let client = s.client.clone();
    let session_id = s.session_id.clone();
    let web_search = s.config.web_search;
    let debug_fail = s.debug_fail.clone();
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        match client
            .send_chat(&session_id, wav, web_search, debug_fail.as_deref())
            .await
        {
            Ok(reply) => {
                let _ = sender.send(BackendEvent::AgentReplyReady(reply)).await;
            }
            Err(msg) => {
                let _ = sender.send(BackendEvent::AgentCallFailed(msg)).await;
            }
        }
    });
}
