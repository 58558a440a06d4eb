use tragamonedas_core::{Paytable, ProvablyFairRng, SpinEngine};

fn main() {
    // Example end-to-end session of five spins
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let rng = ProvablyFairRng::new(server_seed, client_seed, 0);
    let commitment = rng.server_seed_hash_hex();
    let mut engine = SpinEngine::new(3, Paytable::classic(), 100, rng).expect("classic table");
    engine.set_bet(5);
    for _ in 0..5 {
        let outcome = engine.spin();
        println!(
            "nonce={:?} symbols={:?} won={} credits={}",
            engine.rng().current_nonce(),
            outcome.tokens(),
            outcome.amount_won,
            outcome.credits_after
        );
    }
    println!("server_seed_hash={commitment} server_seed={server_seed}");
}
