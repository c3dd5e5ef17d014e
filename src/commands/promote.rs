//! `zettelflow promote <note> <type>` - manual promotion

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use zettelflow_core::error::Result;
use zettelflow_core::note::NoteType;
use zettelflow_core::promote::PromotionEngine;
use zettelflow_core::vault::Vault;

/// Publish `note` as `note_type`, bypassing the quality gate
pub fn execute(cli: &Cli, vault: &Vault, note: &str, note_type: NoteType) -> Result<()> {
    let promotion = PromotionEngine::new(vault).promote_note(note, note_type)?;

    output_by_format_result!(cli.format,
        json => print_json(&promotion),
        human => {
            if promotion.changed {
                println!(
                    "Promoted {} as {} to {}",
                    promotion.note,
                    promotion.note_type,
                    promotion.to.display()
                );
            } else {
                println!(
                    "{} is already a published {} note",
                    promotion.note, promotion.note_type
                );
            }
        }
    )
}
