fn main() {
    kacket::cli::run();
}
