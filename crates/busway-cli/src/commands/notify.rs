//! Manual notification dispatch.

use clap::{Args, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use busway_core::config::AppConfig;
use busway_core::error::AppError;
use busway_entity::notification::{DeliveryChannel, NewNotification, Notification, NotificationType};

use crate::output::{self, OutputFormat};

/// Arguments for the notify command
#[derive(Debug, Args)]
pub struct NotifyArgs {
    /// Recipient user ID or email
    #[arg(short, long)]
    pub user: String,
    /// Notification type, e.g. `journey-reminder`
    #[arg(short = 't', long = "type", default_value = "journey-reminder")]
    pub notification_type: String,
    /// Title
    #[arg(long)]
    pub title: String,
    /// Message body
    #[arg(short, long)]
    pub message: String,
    /// Channels to deliver over
    #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = [ChannelArg::Email, ChannelArg::Push])]
    pub channels: Vec<ChannelArg>,
}

/// Delivery channel accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelArg {
    /// Email
    Email,
    /// Push
    Push,
}

impl From<ChannelArg> for DeliveryChannel {
    fn from(channel: ChannelArg) -> Self {
        match channel {
            ChannelArg::Email => DeliveryChannel::Email,
            ChannelArg::Push => DeliveryChannel::Push,
        }
    }
}

/// Delivery outcome row
#[derive(Debug, Serialize, Tabled)]
struct DeliveryRow {
    /// Notification ID
    id: String,
    /// Aggregate status
    status: String,
    /// Email delivered
    email_sent: bool,
    /// Push delivered
    push_sent: bool,
    /// Next retry
    next_attempt_at: String,
}

impl From<&Notification> for DeliveryRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            status: format!("{:?}", n.status).to_lowercase(),
            email_sent: n.email_sent,
            push_sent: n.push_sent,
            next_attempt_at: n
                .next_attempt_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute the notify command
pub async fn execute(
    args: &NotifyArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let notification_type: NotificationType = args.notification_type.parse()?;
    let state = super::build_state(config).await?;
    let recipient = state.admin_user_service.find_user(&args.user).await?;

    let notification = state
        .dispatcher
        .dispatch(NewNotification {
            user_id: recipient.id,
            notification_type,
            title: args.title.clone(),
            message: args.message.clone(),
            channels: args.channels.iter().copied().map(Into::into).collect(),
            related_id: None,
            related_type: None,
            translations: None,
        })
        .await?;

    output::print_item(&DeliveryRow::from(&notification), format);
    Ok(())
}
