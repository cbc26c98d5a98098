use cad_sectors::resource::file::FileClient;
use cad_sectors::{LocalSectorSource, SectorDataSource};

/// Usage: `cargo run --example read_local -- <model directory>`
#[tokio::main(flavor = "current_thread")]
pub async fn main() {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "assets/model".to_string());
    let source = LocalSectorSource::new(&format!("file://{dir}"), FileClient);

    let metadata = source.fetch_sector_metadata().await.unwrap();
    println!("Model matrix: {:?}", metadata.transformation.model_matrix);

    for sector in metadata.scene.iter() {
        let indent = "  ".repeat(sector.depth());
        match source.fetch_sector_geometry(sector.id).await {
            Ok(bytes) => println!("{indent}{} {} ({} bytes)", sector.id, sector.path, bytes.len()),
            Err(error) => println!("{indent}{} {} ({error})", sector.id, sector.path),
        }
    }
}
