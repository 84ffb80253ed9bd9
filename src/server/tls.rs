use native_tls::Identity;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Creates a native-tls Identity from the specified DER-formatted PKCS #12 archive.
pub fn identity<P: AsRef<Path>, T: Into<String>>(identity_file: P, password: T) -> std::io::Result<Identity> {
    let mut file = File::open(identity_file)?;
    let mut der = vec![];
    file.read_to_end(&mut der)?;
    let pw: String = password.into();
    Identity::from_pkcs12(&der, &pw).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
