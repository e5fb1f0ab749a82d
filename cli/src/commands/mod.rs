pub mod loader;
pub mod player;

use std::sync::Arc;

use aimp::{dispatch, AimpProxy, Callbacks, Completion, MessageCatalog};
use tokio::runtime::Handle;

use crate::state::reducers::AppAction;
use crate::state::store::Store;

pub use loader::Loader;
pub use player::PlayerCommand;

/// Status line text on success; proxy errors otherwise.
pub type CommandResult = aimp::Result<String>;

/// `"<action failed text>. Reason: <localized message>"`
pub fn failure_message(catalog: &MessageCatalog, action_key: &str, reason: &str) -> String {
    if reason.is_empty() {
        format!("{}. {}", catalog.text(action_key), catalog.text("reason_unknown"))
    } else {
        format!("{}. {}: {}", catalog.text(action_key), catalog.text("reason"), reason)
    }
}

/// Runs `command` and reports the outcome on the status line.
pub async fn run(proxy: &AimpProxy, store: &Store, command: PlayerCommand) -> Completion {
    log::debug!("Running command: {:?}", command);

    let callbacks = Callbacks::new()
        .on_success(|message: String| store.dispatch(AppAction::SetStatusMessage(message)))
        .on_exception(|error, reason| {
            log::warn!("{} failed: {}", command.name(), error);
            let message = failure_message(store.catalog(), command.failure_key(), reason);
            store.dispatch(AppAction::SetStatusMessage(message));
            true
        });

    dispatch(proxy.catalog(), command.execute(proxy), callbacks).await
}

pub fn spawn(runtime: &Handle, proxy: Arc<AimpProxy>, store: Arc<Store>, command: PlayerCommand) {
    runtime.spawn(async move {
        run(&proxy, &store, command).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimp::ScriptedTransport;
    use serde_json::json;

    fn store() -> Store {
        Store::new("http://localhost:3333", MessageCatalog::english())
    }

    #[test]
    fn test_failure_message_format() {
        let catalog = MessageCatalog::english();
        assert_eq!(
            failure_message(&catalog, "error_volume_set", "Volume level is out of range"),
            "Can't set volume level. Reason: Volume level is out of range"
        );
        assert_eq!(
            failure_message(&catalog, "error_play_playback", ""),
            "Can't start playback. Reason unknown"
        );
    }

    #[tokio::test]
    async fn test_successful_command_sets_status() {
        let transport = Arc::new(ScriptedTransport::new().with_reply("volume", json!({ "volume": 45 })));
        let proxy = AimpProxy::new(transport);
        let store = store();

        let completion = run(&proxy, &store, PlayerCommand::SetVolume(45)).await;

        assert_eq!(completion, Completion::Succeeded);
        assert_eq!(store.with_state(|s| s.status_message.clone()), "Volume 45%");
    }

    #[tokio::test]
    async fn test_failed_command_shows_action_and_reason() {
        let transport = Arc::new(
            ScriptedTransport::new().with_fault("volume", 15, "Volume level is out of range [0, 100]."),
        );
        let proxy = AimpProxy::new(transport);
        let store = store();

        let completion = run(&proxy, &store, PlayerCommand::SetVolume(150)).await;

        assert_eq!(completion, Completion::Failed { handled: true });
        assert_eq!(
            store.with_state(|s| s.status_message.clone()),
            "Can't set volume level. Reason: Volume level is out of range"
        );
    }

    #[tokio::test]
    async fn test_unknown_code_keeps_number_in_status() {
        let transport = Arc::new(ScriptedTransport::new().with_fault("play_next", 42, "?"));
        let proxy = AimpProxy::new(transport);
        let store = store();

        run(&proxy, &store, PlayerCommand::Next).await;

        assert_eq!(
            store.with_state(|s| s.status_message.clone()),
            "Can't play next track. Reason: Unknown error 42"
        );
    }
}
