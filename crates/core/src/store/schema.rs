pub const SCHEMA: &str = "
-- One row per storage key, value is JSON text
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,         -- e.g. prompts, squarePrompts
    value TEXT NOT NULL,          -- JSON document
    updated_at INTEGER NOT NULL   -- Unix timestamp (milliseconds)
);
";
