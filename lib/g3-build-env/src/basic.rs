/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2025 ByteDance and/or its affiliates.
 */

use std::env;

fn export_env(name: &str, value: &str) {
    println!("cargo:rustc-env={name}={value}");
}

fn export_cargo_env(name: &str, cargo_var: &str) {
    let value = env::var(cargo_var).unwrap_or_else(|_| "unknown".to_string());
    export_env(name, &value);
}

/// Export the rustc and cargo build profile info to the compiling crate.
///
/// The crate can then read them back with `env!("G3_BUILD_*")`.
pub fn check_basic() {
    match rustc_version::version_meta() {
        Ok(rustc) => {
            export_env("G3_BUILD_RUSTC_VERSION", &rustc.short_version_string);
            export_env("G3_BUILD_RUSTC_CHANNEL", &format!("{:?}", rustc.channel));
        }
        Err(_) => {
            export_env("G3_BUILD_RUSTC_VERSION", "unknown");
            export_env("G3_BUILD_RUSTC_CHANNEL", "unknown");
        }
    }

    export_cargo_env("G3_BUILD_HOST", "HOST");
    export_cargo_env("G3_BUILD_TARGET", "TARGET");
    export_cargo_env("G3_BUILD_PROFILE", "PROFILE");
    export_cargo_env("G3_BUILD_OPT_LEVEL", "OPT_LEVEL");
    export_cargo_env("G3_BUILD_DEBUG", "DEBUG");

    println!("cargo:rerun-if-env-changed=G3_PACKAGE_VERSION");
    if let Ok(v) = env::var("G3_PACKAGE_VERSION") {
        export_env("G3_PACKAGE_VERSION", &v);
    }
}
