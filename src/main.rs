fn main() -> anyhow::Result<()> {
    room_viewer::run()
}
