//! Case closing: resolving every open case on a piece of content at once.
//!
//! When the moderation channel moves past a case, all of its duplicates
//! close with it. The recorded actions across the duplicates are unioned,
//! the target author gets one moderation notice per notifying action (with
//! the appeal ticket), each human reporter is told their report was
//! resolved, and everything lands in the archive.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::info;

use modbot_core::{Action, ContentRef, APPEAL_KEYWORD};

use crate::case::CaseState;
use crate::engine::Engine;

impl Engine {
    /// Close every open case targeting `content`.
    pub(crate) async fn close_case(&mut self, content: ContentRef) -> Result<()> {
        let mut cases = self.registry.take_active_for_content(&content);
        if cases.is_empty() {
            return Ok(());
        }

        let actions: BTreeSet<Action> = cases
            .iter()
            .flat_map(|case| case.actions.iter().copied())
            .collect();
        let target = cases
            .iter()
            .find_map(|case| case.target.as_ref())
            .cloned();

        info!(
            ticket = %content,
            cases = cases.len(),
            actions = actions.len(),
            "closing case"
        );

        // One moderation notice per notifying action. Shadow sanctions stay
        // silent; `notifies_on_close` filters them out.
        if let Some(target) = &target {
            for action in actions.iter().filter(|a| a.notifies_on_close()) {
                let notice = format!(
                    "Your following message was moderated:\n\
                     ```{text}```\n\
                     Action taken: {description}.\n\
                     Ticket: `{ticket}`\n\
                     If you believe this was a mistake, you can contest it by \
                     sending me `{appeal}` and quoting the ticket.",
                    text = target.text,
                    description = action.description(),
                    ticket = content.ticket(),
                    appeal = APPEAL_KEYWORD,
                );
                self.platform
                    .send_direct_message(target.author, &notice)
                    .await?;
            }
        }

        for case in &mut cases {
            case.state = CaseState::Complete;

            // Auto-generated cases have the bot as reporter; nobody to tell.
            if case.reporter == self.config.bot_user {
                continue;
            }
            if let Some(dm_channel) = case.dm_channel {
                let noun = if case.is_appeal { "appeal" } else { "report" };
                let text = format!(
                    "The {} you filed about `{}` has been reviewed by the mods \
                     and is now resolved. Thank you.",
                    noun,
                    content.ticket()
                );
                self.platform.send_message(dm_channel, &text).await?;
            }
        }

        let resolution = format!("Ticket `{}` is resolved.", content.ticket());
        self.platform
            .send_message(self.config.mod_channel, &resolution)
            .await?;

        for case in cases {
            self.registry.archive_case(case);
        }
        Ok(())
    }
}
