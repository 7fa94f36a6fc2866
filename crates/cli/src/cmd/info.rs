use wkpack_lib::platform::Host;

pub fn cmd_info() {
  println!("System:");
  match Host::current() {
    Some(host) => println!("Platform: {}", host),
    _ => println!("Could not detect platform."),
  }
  println!("Packages: macos (fpm), windows (nsis)");
}
