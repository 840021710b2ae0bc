use serenity::{http::Http, model::id::ChannelId};
use std::sync::Arc;
use tracing::warn;

/// Canal donde se publican los avisos de reproducción
pub trait NotificationChannel: Send + Sync {
    /// Envía el texto sin esperar confirmación
    fn post(&self, text: String);
}

pub type ChannelRef = Arc<dyn NotificationChannel>;

/// Canal de texto de Discord
pub struct TextChannelRef {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl TextChannelRef {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }

    pub fn shared(http: Arc<Http>, channel_id: ChannelId) -> ChannelRef {
        Arc::new(Self::new(http, channel_id))
    }
}

impl NotificationChannel for TextChannelRef {
    fn post(&self, text: String) {
        let http = self.http.clone();
        let channel_id = self.channel_id;

        tokio::spawn(async move {
            if let Err(e) = channel_id.say(&http, text).await {
                warn!("⚠️ No se pudo enviar aviso al canal {}: {:?}", channel_id, e);
            }
        });
    }
}
