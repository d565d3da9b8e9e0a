fn main() -> anyhow::Result<()> {
    ember::run()
}
