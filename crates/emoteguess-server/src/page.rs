//! The single-page game UI served at `/`.

/// Game page. Talks to the REST API and listens on `/ws/events`.
pub const GAME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Emoteguess</title>
    <style>
        body {
            background: #0e0e10;
            color: #efeff1;
            font-family: 'Inter', 'Segoe UI', sans-serif;
            margin: 0;
            display: grid;
            grid-template-columns: 1fr 320px;
            gap: 1.5rem;
            padding: 1.5rem;
        }
        h1 { color: #a970ff; margin-top: 0; }
        input, textarea, button {
            background: #18181b; color: #efeff1;
            border: 1px solid #3a3a3d; border-radius: 4px;
            padding: 0.5rem; font: inherit;
        }
        button { cursor: pointer; }
        button:hover { border-color: #a970ff; }
        #status.error { color: #ff6b6b; }
        #card { text-align: center; padding: 2rem; background: #18181b; border-radius: 8px; }
        #card img { max-width: 256px; max-height: 256px; image-rendering: auto; }
        #answer { font-size: 1.5rem; min-height: 2rem; }
        .hidden { display: none; }
        ol { padding-left: 1.5rem; }
        #chat { height: 240px; overflow-y: auto; font-size: 0.85rem; background: #18181b; padding: 0.5rem; }
        #chat b { color: #a970ff; }
    </style>
</head>
<body>
<main>
    <h1>Emoteguess</h1>
    <div>
        <input id="channel" placeholder="twitch channel">
        <button id="load">Load</button>
        <button id="reshuffle">Reshuffle</button>
    </div>
    <p id="status"></p>
    <div id="card" class="hidden">
        <img id="emote" alt="emote">
        <div id="answer"></div>
        <p>Round <span id="position">0</span> / <span id="total">0</span> &middot; Score <span id="score">0</span></p>
        <input id="guess" placeholder="your guess" autocomplete="off">
        <button id="skip">Skip</button>
        <button id="next">Next</button>
    </div>
    <details>
        <summary>Paste emote JSON</summary>
        <textarea id="manual" rows="6" cols="60" placeholder='[{"name":"pog","url":"https://..."}]'></textarea>
        <br><button id="manualLoad">Load JSON</button>
    </details>
</main>
<aside>
    <h2>Leaderboard</h2>
    <ol id="leaderboard"></ol>
    <button id="clear">Reset leaderboard</button>
    <h2>Chat</h2>
    <div id="chat"></div>
</aside>
<script>
const $ = (id) => document.getElementById(id);

function setStatus(message, isError) {
    $('status').textContent = message;
    $('status').className = isError ? 'error' : '';
}

async function api(method, path, body) {
    const init = { method, headers: {} };
    if (body !== undefined) {
        if (typeof body === 'string') {
            init.body = body;
        } else {
            init.headers['Content-Type'] = 'application/json';
            init.body = JSON.stringify(body);
        }
    }
    const res = await fetch(path, init);
    const json = await res.json().catch(() => ({}));
    if (!res.ok) setStatus(json.error || res.statusText, true);
    return json;
}

function renderLeaderboard(entries) {
    $('leaderboard').innerHTML = '';
    for (const e of entries) {
        const li = document.createElement('li');
        li.textContent = `${e.guesser_id} (${e.wins})`;
        $('leaderboard').appendChild(li);
    }
}

function showRound(data) {
    $('card').classList.remove('hidden');
    $('emote').src = data.emote.url;
    $('answer').textContent = '';
    $('position').textContent = data.position + 1;
    $('total').textContent = data.total;
    $('guess').value = '';
    $('guess').focus();
}

function appendChat(sender, text) {
    const line = document.createElement('div');
    const who = document.createElement('b');
    who.textContent = sender + ': ';
    line.appendChild(who);
    line.appendChild(document.createTextNode(text));
    $('chat').appendChild(line);
    while ($('chat').children.length > 200) $('chat').firstChild.remove();
    $('chat').scrollTop = $('chat').scrollHeight;
}

function onEvent(event) {
    const d = event.data;
    switch (event.type) {
        case 'SessionLoaded': $('score').textContent = '0'; break;
        case 'RoundStarted': showRound(d); break;
        case 'RoundWon':
            $('answer').textContent = `${d.emote_name} (first: ${d.guesser_id})`;
            $('score').textContent = d.score;
            break;
        case 'RoundSkipped': $('answer').textContent = d.emote_name; break;
        case 'SequenceExhausted':
            $('emote').removeAttribute('src');
            $('answer').textContent = `No more emotes. Final score ${d.final_score} / ${d.total}`;
            break;
        case 'LeaderboardUpdated': renderLeaderboard(d.entries); break;
        case 'ChatLine': appendChat(d.sender, d.text); break;
        case 'Status': setStatus(d.message, d.is_error); break;
    }
}

function connect() {
    const proto = location.protocol === 'https:' ? 'wss' : 'ws';
    const ws = new WebSocket(`${proto}://${location.host}/ws/events`);
    ws.onmessage = (msg) => onEvent(JSON.parse(msg.data));
    ws.onclose = () => setTimeout(connect, 2000);
}

$('load').onclick = () => api('POST', '/api/load', { channel: $('channel').value });
$('channel').onkeydown = (e) => { if (e.key === 'Enter') $('load').click(); };
$('reshuffle').onclick = () => api('POST', '/api/reshuffle');
$('manualLoad').onclick = () => api('POST', '/api/manual', $('manual').value);
$('skip').onclick = () => api('POST', '/api/skip');
$('next').onclick = () => api('POST', '/api/next');
$('clear').onclick = () => api('DELETE', '/api/leaderboard');
$('guess').onkeydown = async (e) => {
    if (e.key !== 'Enter') return;
    const text = $('guess').value;
    $('guess').value = '';
    const res = await api('POST', '/api/guess', { text });
    if (res.accepted === false && res.reason === 'Mismatch') setStatus('Nope!', false);
};

api('GET', '/api/leaderboard').then((v) => renderLeaderboard(v.entries || []));
api('GET', '/api/state').then((s) => {
    if (s.round) {
        showRound({ emote: { url: s.round.emote_url }, position: s.position, total: s.total });
        $('score').textContent = s.score;
        if (s.round.revealed_name) $('answer').textContent = s.round.revealed_name;
    }
});
connect();
</script>
</body>
</html>
"#;
