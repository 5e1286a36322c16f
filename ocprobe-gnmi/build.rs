fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile protobuf definitions.
    tonic_prost_build::configure()
        .build_server(false)
        .compile_protos(
            &["../proto/gnmi_ext.proto", "../proto/gnmi.proto"],
            &["../proto"],
        )?;

    Ok(())
}
