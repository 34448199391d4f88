fn main() {
    println!("cargo:rerun-if-env-changed=RFIDGATE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=RFIDGATE_WIFI_PASS");
    println!("cargo:rerun-if-env-changed=RFIDGATE_DB_URL");
    println!("cargo:rerun-if-env-changed=RFIDGATE_DB_AUTH");

    // Host builds (tests, simulation) have no ESP-IDF toolchain to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
