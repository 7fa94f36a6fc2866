//! Fixed names and locations baked into the produced packages.

/// Name of the product, used for the staging directory and the archive.
pub const PRODUCT: &str = "wkhtmltox";

/// Subdirectory of the build directory holding the build system output.
pub const APP_DIR: &str = "app";

/// Subdirectory of the build directory the install step writes into.
pub const STAGING_DIR: &str = "wkhtmltox";

/// Subdirectory of the build directory handed to `fpm` as its input.
pub const DIST_DIR: &str = "dist";

/// Install root of the product on macOS.
pub const MACOS_INSTALL_ROOT: &str = "/usr/local";

/// Where `fpm` drops the archive before the post-install hook extracts it.
pub const MACOS_INSTALLER_PREFIX: &str = "/usr/local/share/wkhtmltox-installer";

/// Reverse-DNS prefix for the macOS package identifier.
pub const MACOS_IDENTIFIER_PREFIX: &str = "org.wkhtmltopdf";

/// Name of the generated uninstaller script.
pub const UNINSTALLER: &str = "uninstall-wkhtmltox";

/// Name of the generated post-install hook.
pub const EXTRACT_SCRIPT: &str = "extract.sh";

/// Name of the compressed archive of the staged tree.
pub const ARCHIVE: &str = "wkhtmltox.tar.gz";

/// Flags applied to every compiler variable class on macOS.
pub const MACOS_COMPILER_FLAGS: &str = "-w -stdlib=libc++ -mmacosx-version-min=10.7";

/// Compiler variable classes configured on macOS.
pub const MACOS_FLAG_VARS: [&str; 3] = ["CFLAGS", "CXXFLAGS", "OBJECTIVE_CFLAGS"];

/// qmake arguments forcing static libjpeg and the OpenSSL link line on Windows.
pub const WINDOWS_BUILD_ARGS: &str =
  r#"-D LIBJPEG_STATIC OPENSSL_LIBS="-llibssl -llibcrypto -lUser32 -lAdvapi32 -lGdi32 -lCrypt32""#;

/// File name the Visual C++ redistributable is downloaded to.
pub const VCREDIST: &str = "vcredist.exe";

/// Tool name looked up for installer generation on Windows.
pub const NSIS_TOOL: &str = "NSIS";

/// Binary inside the NSIS install directory.
pub const MAKENSIS: &str = "makensis.exe";
