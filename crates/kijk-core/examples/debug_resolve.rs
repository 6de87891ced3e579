//! Debug script to resolve a kijk.nl page and print what was found
//!
//! Run with: cargo run --example debug_resolve -p kijk-core -- <url>

use kijk_core::{KijkExtractor, parse_video_url};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.kijk.nl/films/video/the-bounty-hunter/CQvs74EAaJj".to_string());

    let Some(page) = parse_video_url(&url) else {
        println!("Not a kijk.nl movie or episode URL: {}", url);
        return Ok(());
    };
    println!("Resolving {:?} {} ({})\n", page.kind, page.id, page.path);

    let extractor = KijkExtractor::new()?;

    match extractor.resolve(&url).await {
        Ok(info) => {
            println!("Title: {}", info.title);
            println!("Description: {}", info.description);
            if let (Some(season), Some(episode)) = (info.season_number, info.episode_number) {
                println!("Season {} episode {}", season, episode);
            }

            println!("\n{} formats:", info.formats.len());
            for format in &info.formats {
                println!(
                    "  {:<20} {:<5} {:>5}x{:<5} {:>8} kbit/s  {}",
                    format.format_id,
                    format.ext,
                    format.width.map(|w| w.to_string()).unwrap_or_default(),
                    format.height.map(|h| h.to_string()).unwrap_or_default(),
                    format.tbr.map(|t| format!("{:.0}", t)).unwrap_or_default(),
                    format.vcodec.as_deref().unwrap_or("?"),
                );
            }

            for (language, tracks) in &info.subtitles {
                for track in tracks {
                    println!("\nSubtitle [{}]: {}", language, track.url);
                }
            }
        }
        Err(e) => {
            println!("✗ Failed to resolve: {}", e);

            // Save the page for inspection
            let html = extractor.client().fetch(&page.path).await?;
            std::fs::write("debug_page.html", &html)?;
            println!("HTML saved to debug_page.html");

            if let Ok(json) = kijk_core::parser::extract_next_data(&html) {
                std::fs::write("debug_next_data.json", &json)?;
                println!("__NEXT_DATA__ saved to debug_next_data.json");
            }
        }
    }

    Ok(())
}
