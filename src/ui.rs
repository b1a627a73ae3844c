use crate::models::{MoodEntry, MOOD_LEVELS};
use chrono::NaiveDate;

pub fn render_index(today: NaiveDate, entry: Option<&MoodEntry>) -> String {
    let selected = entry.map(|e| e.mood);
    let note = entry.and_then(|e| e.note.as_deref()).unwrap_or_default();
    let save_label = if entry.is_some() {
        "Update Today's Mood"
    } else {
        "Save Today's Mood"
    };

    INDEX_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{LONG_DATE}}", &today.format("%A, %B %-d, %Y").to_string())
        .replace("{{MOOD_BUTTONS}}", &mood_buttons(selected))
        .replace("{{SAVE_LABEL}}", save_label)
        .replace("{{DISABLED}}", if selected.is_some() { "" } else { "disabled" })
        .replace("{{NOTE}}", &escape_html(note))
}

pub fn render_history() -> String {
    HISTORY_HTML.replace("{{STYLE}}", STYLE)
}

fn mood_buttons(selected: Option<u8>) -> String {
    MOOD_LEVELS
        .iter()
        .map(|level| {
            let checked = if selected == Some(level.value) { " checked" } else { "" };
            format!(
                r#"<label class="mood" title="{label}"><input type="radio" name="mood" value="{value}" data-label="{label}"{checked} /><span>{emoji}</span></label>"#,
                label = level.label,
                value = level.value,
                emoji = level.emoji,
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
    :root {
      --bg-1: #f3f0fb;
      --bg-2: #d9e7ff;
      --ink: #2b2a38;
      --muted: #6d6a80;
      --accent: #7c5cff;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(60, 48, 120, 0.16);
      --very-sad: #e5707a;
      --sad: #f0a36b;
      --neutral: #f2d46b;
      --happy: #8fd18a;
      --very-happy: #4fbf9f;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 32px 16px 48px;
    }

    main { width: min(460px, 100%); display: grid; gap: 20px; }
    h1 { margin: 0; text-align: center; color: var(--accent); }
    .subtitle { margin: 4px 0 0; text-align: center; color: var(--muted); }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 22px;
    }

    .moods { display: grid; grid-template-columns: repeat(5, 1fr); gap: 10px; }
    .mood input { position: absolute; opacity: 0; }
    .mood span {
      display: grid;
      place-items: center;
      aspect-ratio: 1;
      border-radius: 50%;
      font-size: 2rem;
      border: 2px solid #ddd;
      cursor: pointer;
      transition: transform 200ms ease;
    }
    .mood span:hover { transform: scale(1.08); border-color: var(--accent); }
    .mood input:checked + span { border-color: var(--accent); transform: scale(1.1); box-shadow: 0 6px 18px rgba(124, 92, 255, 0.3); }

    .selected-label { text-align: center; font-weight: 600; min-height: 1.4em; }
    textarea { width: 100%; border-radius: 12px; border: 1px solid #ccc; padding: 10px; font: inherit; resize: none; }

    button, .link {
      display: block;
      width: 100%;
      border: 0;
      border-radius: 12px;
      padding: 12px;
      font: inherit;
      font-weight: 600;
      text-align: center;
      text-decoration: none;
      cursor: pointer;
    }
    .primary { background: var(--accent); color: #fff; margin-top: 14px; }
    .primary:disabled { opacity: 0.5; cursor: default; }
    .links { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; }
    .link, .tab { background: #fff; color: var(--ink); border: 1px solid #ddd; }

    .tabs { display: grid; grid-template-columns: 1fr 1fr; gap: 6px; }
    .tab.active { background: var(--accent); color: #fff; }

    .entry { display: flex; gap: 12px; align-items: flex-start; }
    .entry .emoji { font-size: 1.8rem; }
    .entry .head { display: flex; justify-content: space-between; gap: 8px; }
    .entry .when, .entry .note, .empty { color: var(--muted); font-size: 0.9rem; }

    .overview { display: grid; grid-template-columns: 1fr 1fr; text-align: center; }
    .overview .value { font-size: 1.6rem; font-weight: 700; color: var(--accent); }

    .chart { display: flex; align-items: flex-end; gap: 8px; height: 140px; }
    .chart .bar-wrap { flex: 1; display: flex; flex-direction: column; justify-content: flex-end; align-items: center; height: 100%; }
    .chart .bar { width: 100%; border-radius: 6px 6px 0 0; background: #e3e1ea; }
    .chart-labels { display: flex; gap: 8px; color: var(--muted); font-size: 0.8rem; }
    .chart-labels span { flex: 1; text-align: center; }
    .mood-1 { background: var(--very-sad) !important; }
    .mood-2 { background: var(--sad) !important; }
    .mood-3 { background: var(--neutral) !important; }
    .mood-4 { background: var(--happy) !important; }
    .mood-5 { background: var(--very-happy) !important; }

    .status { text-align: center; min-height: 1.2em; font-size: 0.9rem; }
    .status[data-type="error"] { color: #c0392b; }
    .status[data-type="ok"] { color: #2e8b57; }
    [hidden] { display: none !important; }
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Mood</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main>
    <header>
      <h1>Daily Mood</h1>
      <p class="subtitle">{{LONG_DATE}}</p>
    </header>

    <form id="mood-form" class="card" method="post" action="/mood">
      <h2 class="subtitle">How are you feeling today?</h2>
      <div class="moods">
        {{MOOD_BUTTONS}}
      </div>
      <p class="selected-label" id="selected-label"></p>
      <label for="note">Optional note (what made you feel this way?)</label>
      <textarea id="note" name="note" rows="3" placeholder="Write a note about your day...">{{NOTE}}</textarea>
      <button class="primary" id="save-btn" type="submit" {{DISABLED}}>{{SAVE_LABEL}}</button>
      <div class="status" id="status"></div>
    </form>

    <nav class="links">
      <a class="link" href="/history">History</a>
      <a class="link" href="/history#insights">Insights</a>
    </nav>
  </main>

  <script>
    const form = document.getElementById('mood-form');
    const saveBtn = document.getElementById('save-btn');
    const labelEl = document.getElementById('selected-label');
    const statusEl = document.getElementById('status');
    const radios = Array.from(document.querySelectorAll('input[name="mood"]'));

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const selected = () => radios.find((radio) => radio.checked);

    const syncSelection = () => {
      const radio = selected();
      labelEl.textContent = radio ? radio.dataset.label : '';
      saveBtn.disabled = !radio;
    };

    radios.forEach((radio) => radio.addEventListener('change', syncSelection));
    syncSelection();

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const radio = selected();
      if (!radio) {
        return;
      }
      setStatus('Saving...', 'info');
      try {
        const res = await fetch('/api/entries', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            mood: Number(radio.value),
            note: document.getElementById('note').value
          })
        });
        if (!res.ok) {
          throw new Error((await res.text()) || 'Request failed');
        }
        const data = await res.json();
        saveBtn.textContent = "Update Today's Mood";
        setStatus(data.persisted ? 'Saved' : 'Saved, but storage is unavailable', data.persisted ? 'ok' : 'error');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });
  </script>
</body>
</html>
"#;

const HISTORY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood History</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main>
    <header>
      <a class="link" href="/">&larr; Back</a>
      <h1 id="title">Mood History</h1>
    </header>

    <div class="tabs" role="tablist">
      <button class="tab active" type="button" data-tab="history" role="tab">History</button>
      <button class="tab" type="button" data-tab="insights" role="tab">Insights</button>
    </div>

    <section id="history-view"></section>

    <section id="insights-view" hidden>
      <div class="card">
        <h3>Overview</h3>
        <div class="overview">
          <div><div class="value" id="total">0</div><div>Total Entries</div></div>
          <div><div class="value" id="average">--</div><div>Average Mood</div></div>
        </div>
      </div>
      <div class="card" id="chart-card" hidden>
        <h3>Last 7 Days</h3>
        <div class="chart" id="chart"></div>
        <div class="chart-labels" id="chart-labels"></div>
      </div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const EMOJI = { 1: '😞', 2: '😕', 3: '😐', 4: '😊', 5: '😁' };
    const titleEl = document.getElementById('title');
    const historyEl = document.getElementById('history-view');
    const insightsEl = document.getElementById('insights-view');
    const statusEl = document.getElementById('status');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    const escape = (text) => {
      const div = document.createElement('div');
      div.textContent = text;
      return div.innerHTML;
    };

    const setTab = (tab) => {
      tabs.forEach((button) => button.classList.toggle('active', button.dataset.tab === tab));
      historyEl.hidden = tab !== 'history';
      insightsEl.hidden = tab !== 'insights';
      titleEl.textContent = tab === 'history' ? 'Mood History' : 'Mood Insights';
    };

    const renderHistory = (items) => {
      if (!items.length) {
        historyEl.innerHTML = `
          <div class="card empty">
            <p>No mood entries yet.</p>
            <p>Start tracking your daily mood to see your history here.</p>
          </div>`;
        return;
      }
      historyEl.innerHTML = items
        .map((item) => `
          <div class="card entry">
            <div class="emoji">${item.emoji}</div>
            <div style="flex: 1">
              <div class="head"><strong>${item.mood_label}</strong><span class="when">${item.day_label}</span></div>
              ${item.note ? `<p class="note">${escape(item.note)}</p>` : ''}
            </div>
          </div>`)
        .join('');
    };

    const renderInsights = (data) => {
      document.getElementById('total').textContent = data.total_entries;
      document.getElementById('average').textContent =
        data.average_mood === null ? '--' : data.average_mood.toFixed(1);
      document.getElementById('chart-card').hidden = data.total_entries === 0;
      document.getElementById('chart').innerHTML = data.last_7_days
        .map((day) => {
          const height = day.has_entry ? (day.mood / 5) * 120 : 0;
          const cls = day.has_entry ? `bar mood-${day.mood}` : 'bar';
          const emoji = day.has_entry ? `<div>${EMOJI[day.mood]}</div>` : '';
          return `<div class="bar-wrap"><div class="${cls}" style="height: ${height}px"></div>${emoji}</div>`;
        })
        .join('');
      document.getElementById('chart-labels').innerHTML = data.last_7_days
        .map((day) => `<span>${day.weekday}</span>`)
        .join('');
    };

    const load = async () => {
      const [history, insights] = await Promise.all([
        fetch('/api/history').then((res) => res.json()),
        fetch('/api/insights').then((res) => res.json())
      ]);
      renderHistory(history);
      renderInsights(insights);
    };

    tabs.forEach((button) => button.addEventListener('click', () => setTab(button.dataset.tab)));
    setTab(location.hash === '#insights' ? 'insights' : 'history');
    load().catch((err) => {
      statusEl.textContent = err.message;
      statusEl.dataset.type = 'error';
    });
  </script>
</body>
</html>
"#;
