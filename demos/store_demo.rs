fn main() {
    if let Err(err) = shelfmap::example_apps::run_store_demo(std::env::args().skip(1)) {
        eprintln!("store_demo failed: {err}");
        std::process::exit(1);
    }
}
