mod api;
mod consts;
mod driver;
mod io;
mod ops;
mod structure;
mod util;

use consts::BLOCKS;

fn main() {
    env_logger::init();

    let drive = match driver::file_drive::FileDrive::new("sfs.img", BLOCKS) {
        Ok(drive) => drive,
        Err(error) => {
            eprintln!("cannot open sfs.img: {error}");
            std::process::exit(1);
        }
    };

    let fs = match ops::Sfs::new(drive) {
        Ok(fs) => fs,
        Err(error) => {
            eprintln!("cannot mount sfs.img: {error}");
            std::process::exit(1);
        }
    };
    let mut api = api::SfsApi::new(fs);
    api.initialize(1);

    api.create("/home", 1);
    api.create("/home/hello", 0);

    let fd = api.open("/home/hello");
    if fd < 0 {
        eprintln!("open failed: errno {}", -fd);
        std::process::exit(1);
    }

    let message = b"hello from a very small file system";
    api.write(fd, 0, message.len() as i32, message);

    let mut buffer = vec![0u8; message.len()];
    api.read(fd, 0, message.len() as i32, &mut buffer);
    api.close(fd);

    println!(
        "/home/hello ({} bytes): {}",
        api.getsize("/home/hello"),
        String::from_utf8_lossy(&buffer)
    );

    let root = api.open("/");
    let mut listing = [0u8; 128];
    if api.readdir(root, &mut listing) == 1 {
        let end = listing.iter().position(|b| *b == 0).unwrap_or(0);
        println!("/: {}", String::from_utf8_lossy(&listing[..end]));
    }
    api.close(root);

    api.create("/tmp", 1);
    println!("/tmp type: {}", api.gettype("/tmp"));
    api.delete("/tmp");
}
