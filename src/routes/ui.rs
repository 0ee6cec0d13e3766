use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Paperdesk</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; max-width: 900px; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input, textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    button { margin-top: 1rem; margin-right: 0.5rem; padding: 0.6rem 1rem; }
    pre { background: #f6f8fa; padding: 1rem; overflow: auto; white-space: pre-wrap; }
    table { border-collapse: collapse; margin-top: 1rem; width: 100%; }
    th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; }
    td input { border: none; width: 100%; padding: 0.25rem; }
    .status { color: #555; margin-top: 0.5rem; }
  </style>
</head>
<body>
  <h1>Paperdesk</h1>
  <p>Ask questions about an uploaded document, or review tabular records with optional spreadsheet sync.</p>

  <div class="card">
    <h2>Document Q&amp;A</h2>
    <input id="docFile" type="file" accept=".pdf,.docx" />
    <label>Question</label>
    <textarea id="prompt" rows="3" placeholder="Summarize this document"></textarea>
    <button id="askBtn">Ask</button>
    <pre id="answer"></pre>
  </div>

  <div class="card">
    <h2>Worksheet review</h2>
    <input id="sheetFile" type="file" accept=".csv,.xlsx" />
    <button id="uploadBtn">Load file</button>
    <button id="sampleBtn">Load sample</button>
    <button id="pushBtn">Push to remote sheet</button>
    <div id="sheetStatus" class="status"></div>
    <div id="gridHost"></div>
  </div>

  <script>
    const answer = document.getElementById('answer');
    const sheetStatus = document.getElementById('sheetStatus');
    const gridHost = document.getElementById('gridHost');
    let worksheet = null;

    async function readJson(res) {
      const json = await res.json();
      if (!res.ok) throw new Error(json.error || res.statusText);
      return json;
    }

    document.getElementById('askBtn').addEventListener('click', async () => {
      const fileInput = document.getElementById('docFile');
      if (!fileInput.files.length) {
        answer.textContent = 'Select a document first.';
        return;
      }
      const formData = new FormData();
      formData.append('file', fileInput.files[0]);
      formData.append('prompt', document.getElementById('prompt').value);
      answer.textContent = 'Asking...';
      try {
        const json = await readJson(await fetch('/api/documents/ask', { method: 'POST', body: formData }));
        answer.textContent = json.answer;
      } catch (e) {
        answer.textContent = 'Error: ' + e.message;
      }
    });

    function renderGrid() {
      if (!worksheet) { gridHost.innerHTML = ''; return; }
      const table = document.createElement('table');
      const head = table.insertRow();
      worksheet.columns.forEach(c => {
        const th = document.createElement('th');
        th.textContent = c;
        head.appendChild(th);
      });
      worksheet.rows.forEach((row, r) => {
        const tr = table.insertRow();
        row.forEach((value, c) => {
          const td = tr.insertCell();
          const input = document.createElement('input');
          input.value = value;
          input.addEventListener('change', () => editCell(r, worksheet.columns[c], input.value));
          td.appendChild(input);
        });
      });
      gridHost.innerHTML = '';
      gridHost.appendChild(table);
    }

    function showSync(sync) {
      if (sync.state === 'synced') sheetStatus.textContent = 'Synced (' + sync.updated_cells + ' cells updated)';
      else if (sync.state === 'disabled') sheetStatus.textContent = 'Local-only mode: remote sync is not configured';
      else sheetStatus.textContent = 'Edit saved locally; sync failed: ' + sync.message;
    }

    async function loadFrom(url, options) {
      try {
        const json = await readJson(await fetch(url, options));
        worksheet = json.worksheet;
        sheetStatus.textContent = json.remote_sync_enabled
          ? 'Remote sync enabled'
          : 'Local-only mode: remote sync is not configured';
        renderGrid();
      } catch (e) {
        sheetStatus.textContent = 'Error: ' + e.message;
      }
    }

    document.getElementById('sampleBtn').addEventListener('click', () =>
      loadFrom('/api/worksheets/sample', { method: 'POST' }));

    document.getElementById('uploadBtn').addEventListener('click', () => {
      const fileInput = document.getElementById('sheetFile');
      if (!fileInput.files.length) {
        sheetStatus.textContent = 'Select a CSV or XLSX file first.';
        return;
      }
      const formData = new FormData();
      formData.append('file', fileInput.files[0]);
      loadFrom('/api/worksheets', { method: 'POST', body: formData });
    });

    async function editCell(row, column, value) {
      if (!worksheet) return;
      try {
        const json = await readJson(await fetch('/api/worksheets/' + worksheet.id + '/cells', {
          method: 'PATCH',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ row, column, value })
        }));
        worksheet = json.worksheet;
        showSync(json.sync);
      } catch (e) {
        sheetStatus.textContent = 'Error: ' + e.message;
      }
    }

    document.getElementById('pushBtn').addEventListener('click', async () => {
      if (!worksheet) {
        sheetStatus.textContent = 'Load a worksheet first.';
        return;
      }
      try {
        const json = await readJson(await fetch('/api/worksheets/' + worksheet.id + '/push', { method: 'POST' }));
        showSync(json.sync);
      } catch (e) {
        sheetStatus.textContent = 'Push failed: ' + e.message;
      }
    });
  </script>
</body>
</html>"#)
}
