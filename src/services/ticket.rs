//! Ticket artifact service
//!
//! Renders the conference ticket PNG sent at the end of registration: the
//! ticket template (or a blank canvas) with the attendee's name and email
//! written next to the avatar fetched from the avatar service.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use ab_glyph::{FontVec, PxScale};
use async_trait::async_trait;
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::settings::TicketConfig;
use crate::handlers::artifacts::{Artifact, ArtifactGenerator};
use crate::state::context::ConversationContext;
use crate::utils::errors::{Result, TicketBuddyError};
use crate::utils::helpers::{render_template, sanitize_filename};

const CANVAS_WIDTH: u32 = 600;
const CANVAS_HEIGHT: u32 = 300;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

const AVATAR_OFFSET: (i64, i64) = (80, 140);
const NAME_OFFSET: (i32, i32) = (290, 150);
const EMAIL_OFFSET: (i32, i32) = (290, 175);

/// Generator behind the `generate_ticket` action
#[derive(Clone)]
pub struct TicketGenerator {
    client: Client,
    font: Option<Arc<FontVec>>,
    config: TicketConfig,
}

impl TicketGenerator {
    /// Create a new TicketGenerator instance, loading the configured font
    pub fn new(config: TicketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("TicketBuddy-Bot/1.0")
            .build()?;

        let font = match config.font_path.as_deref() {
            Some(path) => Some(Arc::new(load_font(path)?)),
            None => {
                warn!("No ticket font configured, tickets will carry no name or email");
                None
            }
        };

        Ok(Self { client, font, config })
    }

    /// Render a ticket for one attendee
    pub async fn render(&self, name: &str, email: &str) -> Result<Vec<u8>> {
        let mut ticket = self.load_template().await?;

        if let Some(font) = self.font.as_deref() {
            let scale = PxScale::from(self.config.font_size);
            draw_text_mut(&mut ticket, INK, NAME_OFFSET.0, NAME_OFFSET.1, scale, font, name);
            draw_text_mut(&mut ticket, INK, EMAIL_OFFSET.0, EMAIL_OFFSET.1, scale, font, email);
        }

        if let Some(avatar_url) = self.config.avatar_url.as_deref() {
            let avatar = self.fetch_avatar(avatar_url, email).await?;
            imageops::overlay(&mut ticket, &avatar, AVATAR_OFFSET.0, AVATAR_OFFSET.1);
        }

        let mut buffer = Cursor::new(Vec::new());
        ticket.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    async fn load_template(&self) -> Result<RgbaImage> {
        match self.config.template_path.as_deref() {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(image::load_from_memory(&bytes)?.to_rgba8())
            }
            None => Ok(RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND)),
        }
    }

    fn avatar_url(&self, template: &str, email: &str) -> Result<String> {
        let values = BTreeMap::from([
            ("size".to_string(), self.config.avatar_size.to_string()),
            ("email".to_string(), urlencoding::encode(email).into_owned()),
        ]);
        Ok(render_template(template, &values)?)
    }

    async fn fetch_avatar(&self, template: &str, email: &str) -> Result<RgbaImage> {
        let url = self.avatar_url(template, email)?;
        debug!(url = %url, "Fetching avatar");

        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let avatar = image::load_from_memory(&bytes)?.to_rgba8();
        let size = self.config.avatar_size;
        if avatar.dimensions() == (size, size) {
            Ok(avatar)
        } else {
            Ok(imageops::resize(&avatar, size, size, imageops::FilterType::Triangle))
        }
    }
}

impl std::fmt::Debug for TicketGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketGenerator")
            .field("config", &self.config)
            .field("font_loaded", &self.font.is_some())
            .finish_non_exhaustive()
    }
}

fn load_font(path: &str) -> Result<FontVec> {
    let bytes = std::fs::read(path)?;
    FontVec::try_from_vec(bytes)
        .map_err(|e| TicketBuddyError::Config(format!("Invalid ticket font '{}': {}", path, e)))
}

#[async_trait]
impl ArtifactGenerator for TicketGenerator {
    async fn generate(&self, _text: &str, context: &ConversationContext) -> Result<Artifact> {
        let name = required_field(context, "name")?;
        let email = required_field(context, "email")?;

        let bytes = self.render(name, email).await?;
        info!(size = bytes.len(), "Ticket rendered");

        let file_name = format!("ticket-{}.png", sanitize_filename(name));
        Ok(Artifact::png(file_name, bytes))
    }
}

fn required_field<'a>(context: &'a ConversationContext, field: &str) -> Result<&'a str> {
    context
        .get(field)
        .ok_or_else(|| TicketBuddyError::Artifact(format!("Ticket needs '{}' in context", field)))
}
