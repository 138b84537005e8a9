//! Simple program to generate VAPID keys, and to create and verify the
//! `Authorization` header of a Web Push request

use clap::Parser;
use clio::Input;
use eyre::eyre;
use vapid::{
    generate_vapid, generate_vapid_auth, verify_claims, Claims, VapidAuthorization, VapidKeyPair,
};

#[derive(Parser)]
enum Commands {
    /// Generates a VAPID key pair and prints it as JSON
    Generate,
    /// Creates the `Authorization` header value for a push request
    Sign {
        /// JSON file with `publicKey` and `privateKey`
        keys: Input,
        /// JSON object with the claims of the token
        claims: Input,
    },
    /// Verifies an `Authorization` header value
    Verify {
        /// The header value, `vapid t=..., k=...`
        header: String,
    },
}

fn main() -> eyre::Result<()> {
    let cmds = Commands::parse();

    match cmds {
        Commands::Generate => {
            let keys = generate_vapid()?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        Commands::Sign { keys, claims } => {
            let keys: VapidKeyPair = serde_json::from_reader(keys)?;
            let claims: Claims = serde_json::from_reader(claims)?;

            let header = generate_vapid_auth(&keys, &claims)?;
            println!("Authorization: {header}");
        }
        Commands::Verify { header } => {
            let auth: VapidAuthorization = header.parse()?;
            let claims = auth.verify()?;
            verify_claims(&claims).map_err(|e| eyre!("signature is valid, but {e}"))?;

            println!(
                "Valid token for {:?} from {:?}, expires at {:?}",
                claims.aud(),
                claims.sub(),
                claims.exp()
            );
        }
    }
    Ok(())
}
