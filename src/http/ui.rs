//! The study page served at `/`.
//!
//! One self-contained document: subject form, suggestion buttons, the
//! chapter/topic list and a content pane. Everything talks to `/api/*`.
//! Topic HTML from the server is inserted as-is.

use axum::response::Html;

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>TutorAI</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; }
    body {
      margin: 0; padding: 1.5rem;
      font-family: "Work Sans", system-ui, -apple-system, sans-serif;
      background: #0a0a0a; color: #fafafa;
    }
    ::selection { background: #fafafa; color: #0a0a0a; }
    header { display: flex; align-items: center; gap: 1rem; margin-bottom: 1rem; }
    header p { margin: 0; font-size: 1.1rem; font-weight: 700; color: #ecfeff; }
    main { display: grid; grid-template-columns: 2fr 3fr; gap: 3rem; min-height: 100vh; }
    @media (max-width: 768px) { main { grid-template-columns: 1fr; gap: 1.5rem; } }
    fieldset {
      display: flex; align-items: center; gap: .75rem; margin: 0;
      border: 0; border-radius: .75rem; background: #171717; padding: 0 .75rem 0 1.5rem;
    }
    fieldset:focus-within { outline: 2px solid #083344; }
    #subject {
      flex: 1; min-width: 0; padding: .75rem 0; border: 0; background: transparent;
      color: #a5f3fc; font: inherit; font-weight: 500;
    }
    #subject:focus { outline: none; }
    #subject::placeholder { color: #a3a3a3; }
    button {
      cursor: pointer; border: 0; border-radius: .5rem; font: inherit;
      background: #262626; color: #fafafa; padding: .4rem .8rem;
      transition: opacity .15s, background .15s;
    }
    button:hover { background: #404040; }
    button.primary { background: #083344; color: #a5f3fc; }
    button:disabled { cursor: not-allowed; opacity: .6; }
    .error { color: #dc2626; font-size: .875rem; font-weight: 500; }
    .suggestions { display: flex; flex-direction: column; align-items: flex-start; gap: .5rem; margin-left: .5rem; }
    .suggestions p { color: #a3a3a3; font-size: .875rem; padding-bottom: .5rem; margin: 0; }
    .suggestions button { font-size: .8rem; text-align: start; }
    .chapters { display: flex; flex-direction: column; gap: 2rem; max-width: 300px; margin-top: 2rem; }
    .chapter-title { font-weight: 600; margin: 0 0 1rem; word-break: break-word; }
    .topics { position: relative; margin-left: 1rem; display: flex; flex-direction: column; gap: .5rem; }
    .topics::before {
      content: ""; position: absolute; left: -10px; top: 0; height: 100%; width: 2px;
      border-radius: 9999px; background: rgba(8, 51, 68, .5);
    }
    .topic {
      position: relative; background: none; padding: 0; text-align: start;
      font-size: .875rem; font-weight: 500; color: #fff; word-break: break-word;
    }
    .topic:hover { background: none; opacity: .8; }
    .topic.active { color: #a5f3fc; }
    .topic.active::before {
      content: ""; position: absolute; left: -10px; top: 0; height: 100%; width: 2px;
      border-radius: 9999px; background: rgba(165, 243, 252, .5); z-index: 1;
    }
    .shimmer {
      min-height: 16rem; border-radius: .75rem;
      background: linear-gradient(90deg, #171717 25%, #262626 50%, #171717 75%);
      background-size: 200% 100%; animation: shimmer 1.4s infinite;
    }
    @keyframes shimmer { from { background-position: 200% 0; } to { background-position: -200% 0; } }
    .prose { font-size: .9rem; line-height: 1.6; color: #d4d4d4; }
    .prose h1, .prose h2, .prose h3 { color: #fafafa; }
    .prose a { color: #67e8f9; }
    .prose code { background: #171717; padding: .1rem .3rem; border-radius: .25rem; }
    .prose pre { background: #171717; padding: 1rem; border-radius: .5rem; overflow-x: auto; }
    .prose pre code { padding: 0; }
    .prose table { border-collapse: collapse; }
    .prose th, .prose td { border: 1px solid #404040; padding: .35rem .6rem; }
    [hidden] { display: none !important; }
  </style>
</head>
<body>
  <header><p>TutorAI</p></header>
  <main>
    <section>
      <form id="subject-form">
        <fieldset>
          <input type="text" id="subject" name="subject" placeholder="What do you want to study?"
                 autocomplete="off" required />
          <button type="submit" id="go" class="primary" aria-label="Study">&rarr;</button>
          <button type="button" id="back" aria-label="Back" hidden>&larr;</button>
        </fieldset>
        <p id="subject-error" class="error" hidden></p>
      </form>
      <div id="suggestions" class="suggestions">
        <p>Try something like...</p>
      </div>
      <div id="chapters" class="chapters" hidden></div>
      <div id="list-busy" class="shimmer" hidden></div>
    </section>
    <section>
      <div id="content-busy" class="shimmer" hidden></div>
      <div id="content" class="prose"></div>
      <p id="content-error" class="error" hidden></p>
    </section>
  </main>
  <script>
    const SUGGESTIONS = ["Maths CBSE Class 10", "BCA MDSU 3rd year Operating Systems", "Javascript"];
    const $ = (id) => document.getElementById(id);
    let current = null;
    let busy = false;

    function setBusy(on, pane) {
      busy = on;
      document.querySelectorAll("button").forEach((b) => { b.disabled = on; });
      $("subject").disabled = on;
      $(pane).hidden = !on;
      if (on) window.scrollTo(0, 0);
    }

    function showError(id, message) {
      $(id).textContent = message || "";
      $(id).hidden = !message;
    }

    async function callApi(url, init) {
      const res = await fetch(url, init);
      const body = await res.json().catch(() => ({ error: { message: "Unexpected response from server." } }));
      if (!res.ok || body.error) throw body.error || { message: res.statusText };
      return body;
    }

    function reset() {
      current = null;
      history.pushState(null, "", "/");
      $("subject").value = "";
      $("subject").readOnly = false;
      $("go").hidden = false;
      $("back").hidden = true;
      $("chapters").hidden = true;
      $("chapters").replaceChildren();
      $("suggestions").hidden = false;
      $("content").innerHTML = "";
      showError("subject-error");
      showError("content-error");
    }

    async function selectSubject(subject) {
      showError("subject-error");
      $("suggestions").hidden = true;
      setBusy(true, "list-busy");
      try {
        const data = await callApi("/api/subject?subject=" + encodeURIComponent(subject));
        current = data.subject;
        history.replaceState(null, "", "/?subject=" + encodeURIComponent(current));
        $("subject").value = current;
        $("subject").readOnly = true;
        $("go").hidden = true;
        $("back").hidden = false;
        renderChapters(data.chapters);
      } catch (err) {
        $("suggestions").hidden = false;
        showError("subject-error", err.message);
      } finally {
        setBusy(false, "list-busy");
      }
      const first = document.querySelector(".topic");
      if (first) first.click();
    }

    function renderChapters(chapters) {
      const root = $("chapters");
      root.replaceChildren();
      for (const chapter of chapters) {
        const block = document.createElement("div");
        const title = document.createElement("p");
        title.className = "chapter-title";
        title.textContent = chapter.title;
        const topics = document.createElement("div");
        topics.className = "topics";
        for (const topic of chapter.topics) {
          const key = encodeURIComponent(chapter.title + "-" + topic);
          const btn = document.createElement("button");
          btn.type = "button";
          btn.className = "topic";
          btn.dataset.key = key;
          btn.textContent = topic;
          btn.addEventListener("click", () => loadContent(chapter.title, topic, key));
          topics.appendChild(btn);
        }
        block.append(title, topics);
        root.appendChild(block);
      }
      root.hidden = false;
    }

    async function loadContent(chapter, topic, key) {
      if (busy || !current) return;
      showError("content-error");
      $("content").hidden = true;
      setBusy(true, "content-busy");
      try {
        const data = await callApi("/api/content", {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify({ subject: current, chapter, topic, key }),
        });
        document.querySelectorAll(".topic").forEach((b) => {
          b.classList.toggle("active", b.dataset.key === data.key);
        });
        $("content").innerHTML = data.content;
      } catch (err) {
        showError("content-error", err.message);
      } finally {
        $("content").hidden = false;
        setBusy(false, "content-busy");
      }
    }

    for (const s of SUGGESTIONS) {
      const btn = document.createElement("button");
      btn.type = "button";
      btn.textContent = s;
      btn.addEventListener("click", () => { $("subject").value = s; selectSubject(s); });
      $("suggestions").appendChild(btn);
    }

    $("subject-form").addEventListener("submit", (e) => {
      e.preventDefault();
      if (!current) selectSubject($("subject").value);
    });
    $("back").addEventListener("click", reset);

    const initial = new URLSearchParams(location.search).get("subject");
    if (initial) { $("subject").value = initial; selectSubject(initial); }
  </script>
</body>
</html>
"##;

/// GET /
pub(super) async fn root() -> Html<&'static str> {
    Html(INDEX_HTML)
}
