// Dump the most recent system_history rows as JSON, oldest first.
//
// Usage: cargo run --example dump_history -- [DB_PATH] [LIMIT]
//   DB_PATH  default: ./data/history.db
//   LIMIT    default: 5 (0 means 100, capped at 1000)

use homestats::history_repo::HistoryRepo;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("./data/history.db");
    let limit: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(5);

    let repo = HistoryRepo::connect(path, 1).await?;
    repo.init().await?;
    let records = repo.query(limit).await?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
