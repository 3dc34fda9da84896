use trajpack::{
    CodecConfig, EliasCodec, Entity, LengthTaggedRef, MovementRecorder, Sample, ToFrame,
    testutil::TrajectoryGen,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    // codec settings usually come from the embedding application's config file
    let config: CodecConfig = serde_json::from_str(r#"{"family": "delta"}"#).unwrap();
    let codec = EliasCodec::from(config);

    let mut trajectories = TrajectoryGen::new(0xDEAD_BEEF);
    let mut recorder = MovementRecorder::new(codec.family());

    // record a few players for 256 frames, one of whom dies halfway
    let players: Vec<Entity> = (1..=4).map(Entity::player).collect();
    let walks: Vec<Vec<Sample>> = players.iter().map(|_| trajectories.samples(256)).collect();
    for frame in 0..256u64 {
        for (player, walk) in players.iter().zip(&walks) {
            if player.id == 3 && frame >= 128 {
                continue;
            }
            recorder.record(*player, frame, &walk[frame as usize]);
        }
        if frame == 127 {
            let encoded = recorder.close(players[2], frame).unwrap();
            println!(
                "player {} closed after {} frames: {} coded bits",
                encoded.entity.id,
                encoded.end_frame - encoded.start_frame + 1,
                encoded.coded_bits()
            );
        }
    }

    // a projectile's whole flight is known when it's destroyed
    recorder.record_complete(trajectories.projectile(99, 40, 60));

    let round = recorder.finish_round(1, 255);
    for encoded in &round.trajectories {
        let samples = (encoded.end_frame - encoded.start_frame + 1) as usize;
        let axes = encoded.axes.len();
        println!(
            "{:?} {}: {} bits for {} samples ({:.2} bits/value, fixed width would use 16)",
            encoded.entity.kind,
            encoded.entity.id,
            encoded.coded_bits(),
            samples,
            encoded.coded_bits() as f64 / (samples * axes) as f64
        );
    }

    // every axis can be shipped as a checksummed buffer and read in place
    let x_bits = &round.trajectories[0].axes[&trajpack::Axis::X];
    let bytes = x_bits.to_frame();
    let x_ref = LengthTaggedRef::from_bytes(bytes.clone()).unwrap();
    assert_eq!(&x_ref, x_bits);
    println!("X axis of the first trajectory: {} bytes on the wire", bytes.len());

    let deltas = codec.decode(&x_ref).unwrap();
    println!("first deltas: {:?}", &deltas[..8.min(deltas.len())]);

    // or persisted as a document
    let json = serde_json::to_string_pretty(&round.trajectories[0]).unwrap();
    println!("{}", &json[..json.len().min(400)]);

    for encoded in &round.trajectories {
        let decoded = encoded.decode().unwrap();
        assert_eq!(decoded.entity(), encoded.entity);
    }
}
