//! Prompt templates for the commit grouping oracle.

/// System prompt for partitioning diff units into logical commits.
pub const SYSTEM_PROMPT: &str = r#"You are an expert software engineer splitting a set of uncommitted changes into logically coherent git commits. You will receive a catalog of diff units (one per hunk, each with an id, its file, and a short summary), the full unified diff for context, and optionally extra instructions from the user.

Your task is to partition the units into one or more groups, where each group forms a single coherent commit with a clear purpose.

Grouping Rules:
1. **MOST IMPORTANT**: Group by what the code changes actually do, based on the diff content - not by file paths alone
2. A bug fix and an unrelated refactor must land in different commits, even when they touch the same file
3. Changes that only make sense together (a function and its call sites, a type and its uses) belong in the same commit
4. Every unit id from the catalog must appear in exactly one group - never skip a unit, never assign one twice
5. Prefer fewer, well-scoped commits over many fragments; a single commit is fine when the changes are one logical unit
6. Order groups so that earlier commits do not depend on later ones

Commit Message Rules:
1. Follow conventional commit format: <type>(<scope>): <description>
2. Use imperative mood ("add" not "added"), lowercase description, no trailing period
3. Base the message on what the grouped changes actually do

CRITICAL RESPONSE FORMAT: You MUST respond with ONLY a valid JSON array. Do not include any explanatory text, markdown wrappers, or code blocks. Your entire response must be parseable JSON.

Your response must follow this exact structure:

[
  {"message": "fix(parser): handle empty input", "units": ["src/parser.rs:1", "src/parser.rs:2"]},
  {"message": "feat(cli): add --json flag", "units": ["src/cli.rs:1"]}
]

DO NOT include:
- Any explanatory text before or after the JSON
- Markdown code blocks (```)
- Commentary or analysis
- Unit ids that are not in the catalog"#;

/// Builds the user prompt from the unit catalog, the full diff, and any
/// user-supplied grouping instructions.
pub fn generate_user_prompt(catalog: &str, full_diff: &str, instructions: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Diff Unit Catalog\n\n");
    prompt.push_str(catalog);
    prompt.push_str("\n\n# Full Diff\n\n```diff\n");
    prompt.push_str(full_diff);
    prompt.push_str("\n```\n");

    if !instructions.trim().is_empty() {
        prompt.push_str("\n# Additional Instructions\n\n");
        prompt.push_str(instructions);
        prompt.push('\n');
    }

    prompt.push_str(
        "\nPartition every unit id from the catalog into commit groups and respond with \
         the JSON array only.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_includes_catalog_and_diff() {
        let prompt = generate_user_prompt("[{\"id\": \"a.rs:1\"}]", "diff --git ...", "");
        assert!(prompt.contains("a.rs:1"));
        assert!(prompt.contains("diff --git"));
        assert!(!prompt.contains("Additional Instructions"));
    }

    #[test]
    fn user_prompt_includes_instructions_when_present() {
        let prompt = generate_user_prompt("[]", "", "keep docs separate");
        assert!(prompt.contains("Additional Instructions"));
        assert!(prompt.contains("keep docs separate"));
    }

    #[test]
    fn system_prompt_demands_json_only() {
        assert!(SYSTEM_PROMPT.contains("JSON array"));
    }
}
