fn main() -> anyhow::Result<()> {
    memlens::run()
}
