//! Prompt templates for website generation.

use minijinja::{Environment, context};
use sitesmith_core::bundle::CodeBundle;
use sitesmith_core::generation::GenerationError;

const PLAN_TEMPLATE: &str = r#"You are a creative director who designs striking single-page websites.

Write a project plan for the request below. Cover:
- the purpose of the site and who it is for
- the mood, color palette and typography
- the sections of the page, in scroll order (1-3 for simple sites, 4-6 for functional ones)
- the interactions: buttons, forms, animations, navigation style

Write short paragraphs and bullet points. Do not mention code, files or technologies.

User request: "{{ prompt }}"

Project plan:"#;

const RULES: &str = r#"RULES:
- The site is a single page. index.html is the only HTML file; never link to other .html pages.
- Pages are sections of index.html, navigated with JavaScript.
- data.json holds every piece of content: text, headings, image URLs, numbers.
- index.html is structure only, styles.css is styling only, script.js fetches data.json and renders it.
- Images use direct HTTPS URLs from reliable free sources.
- Favor full-screen, bold, expressive layouts over dashboards and card grids.
- Output only the file sections, with no commentary and no Markdown."#;

const FULL_TEMPLATE: &str = r#"{{ rules }}

Using the project plan below, write all four files.

Output them exactly in this format:

--- data.json ---
[complete JSON]

--- index.html ---
[complete HTML starting with <!DOCTYPE html>]

--- styles.css ---
[complete CSS]

--- script.js ---
[complete JavaScript]

PROJECT PLAN:
{{ plan }}"#;

const INCREMENTAL_TEMPLATE: &str = r#"{{ rules }}
- Output only the files that must change, each in full.
- Change content through data.json first, then adapt script.js to render it.

Current files:

--- data.json ---
{{ bundle.data_document }}

--- index.html ---
{{ bundle.markup }}

--- styles.css ---
{{ bundle.style }}

--- script.js ---
{{ bundle.script }}

User request: "{{ prompt }}"

Output each changed file in this format, and omit unchanged files:

--- <file name> ---
[complete file]"#;

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("plan.txt", PLAN_TEMPLATE)?;
    env.add_template("full.txt", FULL_TEMPLATE)?;
    env.add_template("incremental.txt", INCREMENTAL_TEMPLATE)?;
    Ok(env)
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, GenerationError> {
    let env = environment().map_err(|e| GenerationError::Prompt(e.to_string()))?;
    env.get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| GenerationError::Prompt(e.to_string()))
}

/// Prompt asking for a prose plan.
pub fn plan_prompt(prompt: &str) -> Result<String, GenerationError> {
    render("plan.txt", context! { prompt })
}

/// Prompt asking for all four files, driven by `plan`.
pub fn full_generation_prompt(plan: &str) -> Result<String, GenerationError> {
    render("full.txt", context! { rules => RULES, plan })
}

/// Prompt asking only for the files that change.
pub fn incremental_prompt(prompt: &str, bundle: &CodeBundle) -> Result<String, GenerationError> {
    render(
        "incremental.txt",
        context! { rules => RULES, prompt, bundle },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prompt_quotes_request() {
        let prompt = plan_prompt("a bakery <site>").unwrap();
        assert!(prompt.contains("User request: \"a bakery <site>\""));
        assert!(prompt.ends_with("Project plan:"));
    }

    #[test]
    fn test_full_prompt_lists_sections() {
        let prompt = full_generation_prompt("Warm colors").unwrap();
        for marker in [
            "--- data.json ---",
            "--- index.html ---",
            "--- styles.css ---",
            "--- script.js ---",
        ] {
            assert!(prompt.contains(marker), "missing {marker}");
        }
        assert!(prompt.contains("single page"));
        assert!(prompt.ends_with("Warm colors"));
    }

    #[test]
    fn test_incremental_prompt_embeds_current_files() {
        let bundle = CodeBundle::new("<!DOCTYPE html><p>hi</p>", "p {}", "render();", r#"{"a":1}"#);
        let prompt = incremental_prompt("make it blue", &bundle).unwrap();
        assert!(prompt.contains("<!DOCTYPE html><p>hi</p>"));
        assert!(prompt.contains(r#"{"a":1}"#));
        assert!(prompt.contains("make it blue"));
    }
}
