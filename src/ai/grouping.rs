//! Grouping oracle client: asks the AI to partition diff units into
//! commit groups, then validates and repairs the returned partition.
//!
//! The repair step guarantees the coverage invariant the apply engine
//! relies on: after [`repair_coverage`], every parsed unit id appears in
//! exactly one group. Units the AI forgot are appended to the last group
//! rather than dropped; duplicate assignments keep their first occurrence.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::ai::error::OracleError;
use crate::ai::{prompts, AiClient};
use crate::git::diff::DiffUnit;

/// A named bundle of diff units forming one logical commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitGroup {
    /// Commit message for this group.
    pub message: String,
    /// Identifiers of the units assigned to this group (`"path:index"`).
    pub units: Vec<String>,
}

/// Client that obtains a validated unit partition from an AI model.
pub struct GroupingClient {
    client: Box<dyn AiClient>,
}

impl GroupingClient {
    /// Creates a grouping client backed by the given AI client.
    pub fn new(client: Box<dyn AiClient>) -> Self {
        Self { client }
    }

    /// Requests a partition of `units` into commit groups.
    ///
    /// Sends the unit catalog plus the full diff to the model, parses the
    /// structured response, and repairs coverage gaps. Fails with
    /// [`OracleError`] when the call fails, the response is unparseable,
    /// or no usable group survives validation.
    pub async fn request_groups(
        &self,
        units: &[DiffUnit],
        full_diff: &str,
        instructions: &str,
    ) -> Result<Vec<UnitGroup>> {
        let catalog = build_catalog(units);
        let user_prompt = prompts::generate_user_prompt(&catalog, full_diff, instructions);

        debug!(
            unit_count = units.len(),
            prompt_len = user_prompt.len(),
            "Requesting commit grouping"
        );

        let response = self
            .client
            .send_request(prompts::SYSTEM_PROMPT, &user_prompt)
            .await?;

        let mut groups = parse_group_response(&response)?;
        let all_ids: Vec<String> = units.iter().map(DiffUnit::id).collect();
        repair_coverage(&mut groups, &all_ids);

        Ok(groups)
    }
}

/// Renders the unit catalog sent to the model: one `{id, file, summary}`
/// object per unit.
fn build_catalog(units: &[DiffUnit]) -> String {
    let entries: Vec<serde_json::Value> = units
        .iter()
        .map(|u| {
            json!({
                "id": u.id(),
                "file": u.path,
                "summary": u.summary,
            })
        })
        .collect();

    // A Vec<Value> always serializes.
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

/// Parses the model's response into groups, discarding unusable elements.
///
/// The response may be wrapped in a fenced code block; the fence is
/// stripped before JSON parsing. Elements with an empty message or an
/// empty unit list are discarded; if nothing survives, the call counts as
/// a format failure rather than a silent empty success.
pub fn parse_group_response(content: &str) -> Result<Vec<UnitGroup>> {
    let body = strip_code_fences(content);

    let parsed: Vec<UnitGroup> = serde_json::from_str(body)
        .map_err(|e| OracleError::InvalidResponseFormat(format!("JSON parsing error: {e}")))?;

    let groups: Vec<UnitGroup> = parsed
        .into_iter()
        .filter(|g| !g.message.trim().is_empty() && !g.units.is_empty())
        .collect();

    if groups.is_empty() {
        return Err(OracleError::NoUsableGroups.into());
    }

    Ok(groups)
}

/// Extracts the payload from a markdown code fence, if present.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the info string ("json", "yaml", ...) up to the first newline.
        let body = rest.split_once('\n').map_or("", |(_, b)| b);
        body.rsplit_once("```").map_or(body, |(b, _)| b).trim()
    } else {
        trimmed
    }
}

/// Repairs the partition so every known id appears in exactly one group.
///
/// Unknown ids are dropped, duplicates keep their first assignment, and
/// any ids the model failed to assign are appended to the last group so
/// no change is silently left uncommitted.
pub fn repair_coverage(groups: &mut Vec<UnitGroup>, all_ids: &[String]) {
    let known: HashSet<&str> = all_ids.iter().map(String::as_str).collect();
    let mut seen: HashSet<String> = HashSet::new();

    for group in groups.iter_mut() {
        group
            .units
            .retain(|id| known.contains(id.as_str()) && seen.insert(id.clone()));
    }
    groups.retain(|g| !g.units.is_empty());

    let missing: Vec<String> = all_ids
        .iter()
        .filter(|id| !seen.contains(*id))
        .cloned()
        .collect();

    if missing.is_empty() {
        return;
    }

    debug!(count = missing.len(), "Repairing unassigned units");
    if let Some(last) = groups.last_mut() {
        last.units.extend(missing);
    } else {
        // Every returned group referenced only unknown ids; fall back to
        // a single group covering everything.
        groups.push(UnitGroup {
            message: "Apply remaining changes".to_string(),
            units: missing,
        });
    }
}
