use crate::bundle::CodeBundle;
use crate::preview::markup::escape_attribute;

/// Greeting posted as the first message of every new project.
pub fn welcome_message(project_name: &str) -> String {
    format!(
        "# Welcome to **{project_name}**\n\n\
         I'm your AI web developer.\n\n\
         Tell me what you want to build:\n\
         • Modern portfolio\n\
         • Restaurant site\n\
         • SaaS landing page\n\
         • Blog with animations\n\
         • Anything!\n\n\
         I'll create a responsive site using only 4 files, and you can edit the content in **data.json**.\n\n\
         Just type your idea below"
    )
}

/// Placeholder site shown before the first version exists. Not persisted.
pub fn starter_bundle(project_name: &str) -> CodeBundle {
    let title = escape_attribute(project_name);
    let markup = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <link rel="stylesheet" href="styles.css" />
</head>
<body>
  <div class="sky" id="sky"></div>
  <main class="container">
    <h1 id="headline"></h1>
    <p id="tagline"></p>
  </main>
  <script src="script.js"></script>
</body>
</html>"#
    );

    let style = r#"* { margin: 0; padding: 0; box-sizing: border-box; }

body {
  font-family: system-ui, sans-serif;
  background: radial-gradient(circle at center, #0b1026, #000);
  color: #e0e0ff;
  min-height: 100vh;
  display: grid;
  place-items: center;
  overflow: hidden;
}

.container { text-align: center; padding: 4rem 2rem; max-width: 760px; position: relative; z-index: 1; }
h1 { font-size: 3.5rem; margin-bottom: 1.25rem; }
p { font-size: 1.4rem; opacity: 0.85; line-height: 1.6; }

.sky { position: fixed; inset: 0; pointer-events: none; }
.star {
  position: absolute;
  width: 2px;
  height: 2px;
  border-radius: 50%;
  background: #fff;
  animation: twinkle 3s ease-in-out infinite alternate;
}

@keyframes twinkle { from { opacity: 0.2; } to { opacity: 1; } }"#;

    let script = r#"fetch("data.json")
  .then((response) => response.json())
  .then((data) => {
    document.getElementById("headline").textContent = data.headline;
    document.getElementById("tagline").textContent = data.tagline;
  });

const sky = document.getElementById("sky");
for (let i = 0; i < 80; i++) {
  const star = document.createElement("span");
  star.className = "star";
  star.style.left = Math.random() * 100 + "%";
  star.style.top = Math.random() * 100 + "%";
  star.style.animationDelay = Math.random() * 3 + "s";
  sky.appendChild(star);
}"#;

    let data_document = r#"{
  "headline": "Describe your website",
  "tagline": "Tell the assistant what to build and watch it appear here."
}"#;

    CodeBundle::new(markup, style, script, data_document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_data_document_parses() {
        let bundle = starter_bundle("Demo");
        let data: serde_json::Value = serde_json::from_str(&bundle.data_document).unwrap();
        assert!(data.get("headline").is_some());
        assert!(bundle.markup.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_starter_title_is_escaped() {
        let bundle = starter_bundle("a</title><script>");
        assert!(bundle.markup.contains("<title>a&lt;/title&gt;&lt;script&gt;</title>"));
        assert!(!bundle.markup.contains("<script>"));
    }
}
