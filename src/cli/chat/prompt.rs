use rustyline::{Config, Editor, Result};

const MAX_LINE_HISTORY: usize = 200;

pub fn generate_prompt(pending_city: bool) -> String {
    if pending_city {
        "cidade> ".to_string()
    } else {
        "> ".to_string()
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .history_ignore_dups(true)
        .max_history_size(MAX_LINE_HISTORY)
        .auto_add_history(false)
        .build();
    Editor::with_config(config)
}
