/// Example: Load and view an `.obj` file in the terminal, normalized to fit
///
/// Usage: cargo run --example load_obj -- path/to/file.obj
use std::env;
use std::io;
use wf3d_core::mesh::MAX_MEASURE;
use wf3d_core::obj::load_obj_file;
use wf3d_core::ObjWireFrame;
use wf3d_terminal::TerminalApp;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let (mut model, name) = match args.get(1) {
        Some(path) => {
            println!("Loading OBJ file: {}", path);
            (load_obj_file(path)?, path.as_str())
        }
        None => {
            eprintln!("Usage: {} <obj-file>", args[0]);
            eprintln!("\nNo OBJ file provided, using default cube...");
            (ObjWireFrame::cube(1.0), "cube")
        }
    };

    model
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    model.normalize_to_view(MAX_MEASURE);

    println!(
        "Loaded {} vertices, {} faces",
        model.vertices.len(),
        model.faces.len()
    );
    println!("Starting terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::with_wire_frame(model, name)?;
    app.run()?;

    Ok(())
}
