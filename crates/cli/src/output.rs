// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;

/// Determine if color output should be enabled.
///
/// Delegates to [`crate::color::should_colorize`] — the single source of truth
/// for color detection across the CLI.
pub fn should_use_color() -> bool {
    crate::color::should_colorize()
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d")
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let elapsed_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    if elapsed_secs < 60 {
        format!("{}s", elapsed_secs)
    } else if elapsed_secs < 3600 {
        format!("{}m", elapsed_secs / 60)
    } else if elapsed_secs < 86400 {
        format!("{}h", elapsed_secs / 3600)
    } else {
        format!("{}d", elapsed_secs / 86400)
    }
}

/// Display a session's captured output snapshot, with optional follow mode.
///
/// Sessions have no persistent log file — "following" re-polls the
/// session's pane/process output on an interval instead of tailing a file.
pub async fn display_session_output(
    content: Option<&str>,
    follow: bool,
    format: OutputFormat,
    id: &str,
    mut poll: impl FnMut() -> std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<Option<String>>>>>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            match content {
                Some(content) if !content.is_empty() => {
                    print!("{}", content);
                    if !content.ends_with('\n') {
                        println!();
                    }
                }
                _ => eprintln!("No output captured for session {}", id),
            }

            if follow {
                let ctrl_c = tokio::signal::ctrl_c();
                tokio::pin!(ctrl_c);
                let mut last = content.unwrap_or_default().to_string();
                loop {
                    tokio::select! {
                        _ = &mut ctrl_c => break,
                        _ = tokio::time::sleep(std::time::Duration::from_millis(500)) => {
                            if let Some(next) = poll().await? {
                                if next != last {
                                    print!("{}", next.strip_prefix(&last).unwrap_or(&next));
                                    last = next;
                                }
                            }
                        }
                    }
                }
            }
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "session_id": id,
                "output": content,
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
            if follow {
                eprintln!("warning: --follow is not supported with --output json");
            }
        }
    }
    Ok(())
}
