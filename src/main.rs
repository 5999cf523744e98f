//! Daftar CLI (for testing purposes only)
//! The main interface is through WASM bindings.

use daftar::{Editor, PageMetrics};

fn main() {
    println!("Daftar Manuscript Editor Core");
    println!("=============================");
    println!();

    let sample = [
        "به نام خداوند جان و خرد",
        "کزین برتر اندیشه برنگذرد",
        "خداوند نام و خداوند جای",
        "خداوند روزی ده رهنمای",
    ]
    .join("\n");

    let text = vec![sample; 8].join("\n");
    let mut editor = Editor::with_text(&text, PageMetrics::default());
    editor.trigger_reflow();

    println!("pages after reflow: {}", editor.page_count());
    println!("labels: {}", editor.page_labels().join("، "));
    println!("view: {}", editor.page_info());
    println!();
    println!("This is a library crate. To use it:");
    println!();
    println!("  1. Build WASM: wasm-pack build --target web");
    println!("  2. For testing the core library: cargo test");
}
