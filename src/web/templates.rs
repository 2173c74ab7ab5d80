//! Page templates rendered with Handlebars. Everything interpolated is
//! HTML-escaped by default, which matters because channel names come
//! straight from the environment.

use std::fmt;

use handlebars::Handlebars;

#[derive(Debug)]
pub enum Page {
    Index,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{bot}}</title>
</head>
<body>
  <h1>{{bot}}</h1>
  <p>Listening in:</p>
  <ul>
  {{#each channels}}
    <li><a href="https://twitch.tv/{{this}}">#{{this}}</a></li>
  {{/each}}
  </ul>
  {{#if tts}}
  <audio id="tts" controls src="/public/file.mp3"></audio>
  <script>
    const audio = document.getElementById("tts");
    const scheme = location.protocol === "https:" ? "wss" : "ws";
    const socket = new WebSocket(`${scheme}://${location.host}/check-for-updates`);
    socket.onmessage = (event) => {
      if (JSON.parse(event.data).updated) {
        audio.src = `/public/file.mp3?t=${Date.now()}`;
        audio.play();
      }
    };
  </script>
  {{/if}}
</body>
</html>
"#;

pub fn templates() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(&Page::Index.to_string(), INDEX_PAGE)
        .expect("Failed to register template");
    registry
}
