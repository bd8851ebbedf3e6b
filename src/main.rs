fn main() {
    zune_bin::main()
}
