use paced_http::{RequestOptions, RequestQueue};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = std::env::var("PACED_BASE_URL")?;

    let queue = RequestQueue::new(base_url);

    // Both calls go through the same queue: the second waits for the first
    // to settle plus the pacing delay, even though they are awaited together.
    let (created, listing) = tokio::join!(
        queue.enqueue_json::<Value>(
            "/api/dreams",
            RequestOptions::post_json(&json!({"text": "I was flying over the sea"}))?,
        ),
        queue.enqueue_json::<Value>("/api/dreams", RequestOptions::get()),
    );

    println!("created: {}", created?);
    println!("listing: {}", listing?);

    Ok(())
}
