use crate::{
    console::ConsoleContext,
    core::domain::{
        error::GecosResult,
        model::live_event::{EventObject, LiveEvent, LiveMessage},
        value_object::{NodePath, ResourceId},
    },
};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// What views bound to the console state need to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewNotice {
    /// Someone else modified the resource.
    ResourceChanged { id: ResourceId },
    /// Someone else deleted the resource.
    ResourceDeleted { id: ResourceId },
    /// The job list of the current administrator changed.
    JobsChanged,
    /// The subtree below `path` was reloaded.
    TreeUpdated { path: NodePath },
    /// The server lost its message broker; live updates are unreliable.
    ServiceUnavailable,
    /// A chunk of a tailed log file.
    LogData(Value),
}

/// Applies live notifications to a [`ConsoleContext`].
///
/// The transport is not part of the relay: frames arrive decoded as text
/// through [`LiveUpdateRelay::run`] or one by one through
/// [`LiveUpdateRelay::handle`].
#[derive(Debug)]
pub struct LiveUpdateRelay {
    current_user: Option<String>,
    notices: broadcast::Sender<ViewNotice>,
}

impl LiveUpdateRelay {
    pub fn new(current_user: Option<String>) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            current_user,
            notices,
        }
    }

    /// Registers a view.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewNotice> {
        self.notices.subscribe()
    }

    /// Consumes frames until the sender side is closed. Undecodable frames
    /// and failed refreshes are logged and skipped.
    ///
    /// The context stays borrowed for the whole run, which suits headless
    /// consumers. Applications that also drive the context from views
    /// should instead parse frames themselves and call
    /// [`LiveUpdateRelay::handle`] from their own `tokio::select!` loop.
    pub async fn run(&self, ctx: &mut ConsoleContext, mut frames: mpsc::Receiver<String>) {
        while let Some(frame) = frames.recv().await {
            let message = match LiveMessage::parse(&frame) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping live frame");
                    continue;
                }
            };
            if let Err(e) = self.handle(ctx, message).await {
                tracing::warn!(error = %e, "Live update failed");
            }
        }
        tracing::debug!("Live channel closed");
    }

    /// Applies one message to the context.
    pub async fn handle(&self, ctx: &mut ConsoleContext, message: LiveMessage) -> GecosResult<()> {
        match message {
            LiveMessage::Event(LiveEvent::Change { object }) => self.on_change(ctx, object).await,
            LiveMessage::Event(LiveEvent::Delete { object }) => self.on_delete(ctx, object).await,
            LiveMessage::Event(LiveEvent::Jobs { user }) => {
                if user.is_some() && user == self.current_user {
                    self.notify(ViewNotice::JobsChanged);
                }
                Ok(())
            }
            LiveMessage::Event(LiveEvent::UpdateTree { path }) => {
                let path = NodePath::parse(&path)?;
                ctx.tree.reload_subtree(&path).await?;
                self.notify(ViewNotice::TreeUpdated { path });
                Ok(())
            }
            LiveMessage::BrokerError => {
                tracing::error!("Server message broker unavailable");
                self.notify(ViewNotice::ServiceUnavailable);
                Ok(())
            }
            LiveMessage::LogData(data) => {
                self.notify(ViewNotice::LogData(data));
                Ok(())
            }
            LiveMessage::Unknown(action) => {
                tracing::debug!(action = %action, "Ignoring live message");
                Ok(())
            }
        }
    }

    async fn on_change(&self, ctx: &mut ConsoleContext, object: EventObject) -> GecosResult<()> {
        let id = object.id;
        tracing::debug!(id = %id, "Resource changed remotely");
        ctx.cache.drop(&id);
        ctx.staging.discard_remote(&id);
        self.notify(ViewNotice::ResourceChanged { id: id.clone() });
        ctx.tree.update_node_by_id(&id).await?;
        Ok(())
    }

    async fn on_delete(&self, ctx: &mut ConsoleContext, object: EventObject) -> GecosResult<()> {
        let id = object.id;
        tracing::debug!(id = %id, "Resource deleted remotely");
        ctx.cache.drop(&id);
        ctx.staging.discard_remote(&id);
        self.notify(ViewNotice::ResourceDeleted { id: id.clone() });

        // Only a visible node needs its parent's children refreshed.
        let parent_path = ctx.tree.find_node_by_id(&id).map(|node| node.path.clone());
        if let Some(path) = parent_path {
            ctx.tree.reload_subtree(&path).await?;
        }
        Ok(())
    }

    fn notify(&self, notice: ViewNotice) {
        let _ = self.notices.send(notice);
    }
}
