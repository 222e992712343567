//! CLI channel: stdin/stdout REPL for one conversation.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::dialogue::ConversationState;
use crate::error::ChannelError;
use crate::session::SessionManager;

const CHANNEL: &str = "cli";
const BOT_PREFIX: &str = "-- Chatbot: ";
const USER_PROMPT: &str = "-> Your response: ";

/// Runs a single conversation over a line-oriented reader and writer.
pub struct CliChannel {
    manager: Arc<SessionManager>,
}

impl CliChannel {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Converse over the process's stdin and stdout.
    pub async fn run(&self) -> Result<ConversationState, ChannelError> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.run_with(stdin, tokio::io::stdout()).await
    }

    /// Converse until the order completes, the input ends, or the user
    /// types `/quit`. Returns the final conversation state.
    pub async fn run_with<R, W>(&self, input: R, mut output: W) -> Result<ConversationState, ChannelError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let greeting = self.manager.start().await;
        let id = greeting.session_id;

        // The session is abandoned however the conversation stops.
        let result = self.converse(id, &greeting.message, input, &mut output).await;
        let state = self
            .manager
            .snapshot(id)
            .await
            .map(|session| session.state)
            .unwrap_or_default();
        self.manager.abandon(id).await;
        result.map(|()| state)
    }

    async fn converse<R, W>(
        &self,
        id: Uuid,
        greeting: &str,
        input: R,
        output: &mut W,
    ) -> Result<(), ChannelError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        say(output, greeting).await?;

        let mut lines = input.lines();
        loop {
            write(output, USER_PROMPT).await?;

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(()), // EOF
                Err(e) => {
                    return Err(ChannelError::ReadFailed {
                        name: CHANNEL.to_string(),
                        reason: e.to_string(),
                    });
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "/quit" {
                return Ok(());
            }

            let turn = match self.manager.handle_turn(id, line).await {
                Ok(turn) => turn,
                Err(e) => {
                    tracing::error!(session_id = %id, error = %e, "Turn failed");
                    return Ok(());
                }
            };

            for message in &turn.messages {
                say(output, message).await?;
            }
            if let Some(order_id) = turn.order.as_ref().and_then(|r| r.order_id.as_deref()) {
                say(output, &format!("Your order number is {order_id}.")).await?;
            }
            if let Some(reason) = &turn.order_error {
                tracing::warn!(session_id = %id, reason = %reason, "Order was not submitted");
            }
            if turn.ended {
                return Ok(());
            }
        }
    }
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, message: &str) -> Result<(), ChannelError> {
    write(output, &format!("{BOT_PREFIX}{message}\n")).await
}

async fn write<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<(), ChannelError> {
    let result = async {
        output.write_all(text.as_bytes()).await?;
        output.flush().await
    }
    .await;
    result.map_err(|e| ChannelError::WriteFailed {
        name: CHANNEL.to_string(),
        reason: e.to_string(),
    })
}
