//! Demo walking through the main query shapes: segment, display, area, and
//! hardware picks over a small mixed scene.

use sightline::*;

fn main() -> Result<()> {
    env_logger::init();

    let candidates = build_scene()?;
    let engine = PickEngine::new();

    // A world-space ray straight down the z axis, off-center enough to
    // land inside a cube face triangle.
    let ray = Segment::new(Vec3::new(0.1, 0.05, 5.0), Vec3::new(0.1, 0.05, -5.0));
    let result = engine.pick_segment(&candidates, &ray);
    println!(
        "segment pick: {} at t = {:.3}, world = {:?}",
        result.candidate_name, result.t, result.world_position
    );

    // The same scene through a camera.
    let mut camera = Camera::new(1.0);
    camera.position = Vec3::new(0.0, 0.0, 6.0);
    camera.target = Vec3::ZERO;
    let viewport = (800, 800);

    let result = engine.pick_display(&candidates, &camera, Vec2::new(410.0, 395.0), viewport)?;
    if result.is_hit() {
        println!(
            "display pick: {} ({:?})",
            result.candidate_name, result.element
        );
    } else {
        println!("display pick: background");
    }

    // Everything under a rubber-band rectangle.
    let area = engine.pick_area(
        &candidates,
        &camera,
        Vec2::new(200.0, 200.0),
        Vec2::new(600.0, 600.0),
        viewport,
    )?;
    println!(
        "area pick: {} accepted, primary = {:?}",
        area.accepted.len(),
        area.primary.map(|i| candidates[i].name())
    );

    // A synthetic id buffer standing in for a GPU readback.
    let mut oracle = IdBufferOracle::new(viewport.0, viewport.1);
    let first_id = oracle.allocate(0, 12);
    oracle.write_id(410, 395, first_id); // cell 0 rendered at this pixel
    let result = engine.pick_hardware(
        &candidates,
        &camera,
        &oracle,
        Vec2::new(410.0, 395.0),
        viewport,
        FieldAssociation::Cells,
    )?;
    println!(
        "hardware pick: {} ({:?})",
        result.candidate_name, result.element
    );

    Ok(())
}

fn build_scene() -> Result<Vec<PickCandidate>> {
    // A unit cube centered at the origin.
    let h = 0.5;
    let points = vec![
        Vec3::new(-h, -h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(-h, h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(-h, -h, h),
        Vec3::new(h, -h, h),
        Vec3::new(-h, h, h),
        Vec3::new(h, h, h),
    ];
    let triangles = vec![
        [4, 5, 7],
        [4, 7, 6],
        [0, 2, 3],
        [0, 3, 1],
        [1, 3, 7],
        [1, 7, 5],
        [0, 4, 6],
        [0, 6, 2],
        [2, 6, 7],
        [2, 7, 3],
        [0, 1, 5],
        [0, 5, 4],
    ];
    let mut mesh = SurfaceMesh::from_triangles(points, triangles)?;
    mesh.build_locator();
    let cube = PickCandidate::new("cube", RenderableGeometry::SurfaceMesh(mesh));

    // A small volume with a dense center, placed behind the cube.
    let mut data = vec![0.0_f32; 125];
    data[2 + 2 * 5 + 2 * 25] = 1.0;
    let mut component = VolumeComponent::new(data, ScalarKind::F32);
    component.set_scalar_opacity(PiecewiseFunction::from_points([(0.0, 0.0), (1.0, 1.0)]));
    let volume = ScalarVolume::new(
        Vec3::new(-2.0, -2.0, -6.0),
        Vec3::ONE,
        [0, 4, 0, 4, 0, 4],
        vec![component],
    )?;
    let volume = PickCandidate::new("volume", RenderableGeometry::Volume(volume));

    // An image slice floating to the side.
    let slice = ImageSlice::axis_aligned(
        Vec3::new(2.0, -1.0, 0.0),
        Vec3::splat(0.25),
        [0, 7, 0, 7, 0, 0],
        2,
    )?;
    let slice = PickCandidate::new("slice", RenderableGeometry::ImageSlice(slice));

    Ok(vec![cube, volume, slice])
}
