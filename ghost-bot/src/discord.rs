use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use serenity::all::{
    Channel, ChannelId, Client, Context, EventHandler, GatewayIntents, GetMessages, Http, Message,
    MessageId, Ready, ShardManager, TypingStartEvent, UserId,
};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use ghost_core::{
    ChatNetwork, Peer, RawMessage, RawUpdate, SelfIdentity, UpdateSink, UserLookup, UserTyping,
    WireMessage,
};

const READY_TIMEOUT: Duration = Duration::from_secs(30);

fn intents() -> GatewayIntents {
    GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_TYPING
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

struct Session {
    shard_manager: Arc<ShardManager>,
    gateway: JoinHandle<()>,
    self_id: UserId,
}

/// Discord account driven over the gateway for updates and REST for everything else.
pub struct DiscordNetwork {
    token: String,
    http: Arc<Http>,
    session: Mutex<Option<Session>>,
}

impl DiscordNetwork {
    pub fn new(token: String) -> Self {
        let http = Arc::new(Http::new(&token));
        Self {
            token,
            http,
            session: Mutex::new(None),
        }
    }

    async fn self_id(&self) -> anyhow::Result<UserId> {
        if let Some(session) = self.session.lock().await.as_ref() {
            return Ok(session.self_id);
        }

        let me = self
            .http
            .get_current_user()
            .await
            .context("failed to fetch current user")?;
        Ok(me.id)
    }

    async fn dm_channel(&self, user_id: u64) -> anyhow::Result<ChannelId> {
        let channel = discord_user(user_id)?
            .create_dm_channel(&*self.http)
            .await
            .with_context(|| format!("failed to open DM channel with {user_id}"))?;
        Ok(channel.id)
    }
}

#[async_trait]
impl ChatNetwork for DiscordNetwork {
    async fn login(&self, updates: UpdateSink) -> anyhow::Result<SelfIdentity> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let forwarder = UpdateForwarder {
            updates,
            ready: Mutex::new(Some(ready_tx)),
            self_id: OnceLock::new(),
        };

        info!("Connecting to the Discord gateway...");
        let mut client = Client::builder(&self.token, intents())
            .event_handler(forwarder)
            .await
            .context("failed to build discord client")?;

        let shard_manager = Arc::clone(&client.shard_manager);
        let gateway = tokio::spawn(async move {
            if let Err(err) = client.start().await {
                warn!(?err, "discord gateway stopped");
            }
        });

        let me = match timeout(READY_TIMEOUT, ready_rx).await {
            Ok(Ok(me)) => me,
            Ok(Err(_)) => {
                shard_manager.shutdown_all().await;
                anyhow::bail!("discord gateway closed before the session was ready");
            }
            Err(_) => {
                shard_manager.shutdown_all().await;
                gateway.abort();
                anyhow::bail!("timed out waiting for the discord session to become ready");
            }
        };

        *self.session.lock().await = Some(Session {
            shard_manager,
            gateway,
            self_id: UserId::new(me.id),
        });
        Ok(me)
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        let Some(session) = self.session.lock().await.take() else {
            return Ok(());
        };

        session.shard_manager.shutdown_all().await;
        if let Err(err) = session.gateway.await {
            warn!(?err, "discord gateway task ended abnormally");
        }
        Ok(())
    }

    async fn send_message(&self, user_id: u64, text: &str) -> anyhow::Result<()> {
        let channel_id = self.dm_channel(user_id).await?;
        channel_id
            .say(&*self.http, text)
            .await
            .with_context(|| format!("failed to send DM to {user_id}"))?;
        Ok(())
    }

    async fn lookup_user(&self, user_id: u64) -> anyhow::Result<UserLookup> {
        let user = self
            .http
            .get_user(discord_user(user_id)?)
            .await
            .with_context(|| format!("failed to fetch user {user_id}"))?;

        Ok(UserLookup {
            first_name: user.global_name.unwrap_or_default(),
            last_name: String::new(),
            username: user.name,
        })
    }

    async fn fetch_messages(
        &self,
        user_id: u64,
        offset_id: u64,
        limit: u8,
    ) -> anyhow::Result<Vec<WireMessage>> {
        let self_id = self.self_id().await?;
        let channel_id = self.dm_channel(user_id).await?;

        let mut request = GetMessages::new().limit(limit);
        if offset_id > 0 {
            request = request.before(MessageId::new(offset_id));
        }

        let messages = channel_id
            .messages(&*self.http, request)
            .await
            .with_context(|| format!("failed to fetch DM history with {user_id}"))?;

        Ok(messages
            .into_iter()
            .map(|message| WireMessage {
                id: message.id.get(),
                date: u64::try_from(message.timestamp.unix_timestamp()).unwrap_or_default(),
                out: message.author.id == self_id,
                text: message.content,
            })
            .collect())
    }
}

fn discord_user(user_id: u64) -> anyhow::Result<UserId> {
    if user_id == 0 {
        anyhow::bail!("user id must be non-zero");
    }
    Ok(UserId::new(user_id))
}

/// Gateway handler that turns Discord events into relay updates.
struct UpdateForwarder {
    updates: UpdateSink,
    ready: Mutex<Option<oneshot::Sender<SelfIdentity>>>,
    self_id: OnceLock<UserId>,
}

impl UpdateForwarder {
    fn forward(&self, update: RawUpdate) {
        if self.updates.send(update).is_err() {
            debug!("relay is no longer consuming updates");
        }
    }
}

#[serenity::async_trait]
impl EventHandler for UpdateForwarder {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let _ = self.self_id.set(ready.user.id);
        info!(username = %ready.user.name, "Discord session ready.");

        if let Some(ready_tx) = self.ready.lock().await.take() {
            let _ = ready_tx.send(SelfIdentity {
                id: ready.user.id.get(),
                username: ready.user.name.clone(),
            });
        }
    }

    async fn message(&self, ctx: Context, new_message: Message) {
        let Some(self_id) = self.self_id.get().copied() else {
            return;
        };
        let out = new_message.author.id == self_id;

        if new_message.guild_id.is_some() {
            self.forward(guild_update(&new_message, out));
            return;
        }

        let correspondent = if out {
            match new_message.channel_id.to_channel(&ctx).await {
                Ok(Channel::Private(channel)) => channel.recipient.id,
                Ok(_) => return,
                Err(err) => {
                    warn!(
                        ?err,
                        channel_id = %new_message.channel_id,
                        "failed to resolve DM recipient"
                    );
                    return;
                }
            }
        } else {
            new_message.author.id
        };

        self.forward(direct_update(
            new_message.id.get(),
            correspondent.get(),
            new_message.content,
            out,
        ));
    }

    async fn typing_start(&self, _ctx: Context, event: TypingStartEvent) {
        if event.guild_id.is_some() {
            return;
        }

        self.forward(RawUpdate::UserTyping(UserTyping {
            user_id: Some(event.user_id.get()),
        }));
    }
}

fn direct_update(message_id: u64, correspondent: u64, content: String, out: bool) -> RawUpdate {
    RawUpdate::NewMessage {
        message: Some(RawMessage {
            id: Some(message_id),
            peer: Some(Peer::User {
                user_id: correspondent,
            }),
            from_id: None,
            message: Some(content),
            out,
        }),
    }
}

fn guild_update(message: &Message, out: bool) -> RawUpdate {
    RawUpdate::NewMessage {
        message: Some(RawMessage {
            id: Some(message.id.get()),
            peer: Some(Peer::Channel {
                channel_id: message.channel_id.get(),
            }),
            from_id: Some(message.author.id.get()),
            message: Some(message.content.clone()),
            out,
        }),
    }
}

#[cfg(test)]
mod tests {
    use ghost_core::{ClassifiedEvent, IncomingMessage, classify};

    use super::{direct_update, discord_user};

    #[test]
    fn inbound_dm_classifies_as_direct_from_author() {
        let update = direct_update(5, 42, "hello".to_owned(), false);

        assert_eq!(
            classify(&update),
            ClassifiedEvent::IncomingMessage(IncomingMessage {
                sender_id: 42,
                text: "hello".to_owned(),
                is_direct: true,
                is_outgoing: false,
            })
        );
    }

    #[test]
    fn outbound_dm_is_keyed_by_recipient() {
        let update = direct_update(6, 42, "on my way".to_owned(), true);

        let ClassifiedEvent::IncomingMessage(message) = classify(&update) else {
            panic!("expected a message");
        };
        assert_eq!(message.sender_id, 42);
        assert!(message.is_outgoing);
    }

    #[test]
    fn zero_user_id_is_rejected() {
        assert!(discord_user(0).is_err());
        assert_eq!(discord_user(9).unwrap().get(), 9);
    }
}
