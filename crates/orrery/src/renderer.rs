//! GPU side of the solar system: pipelines, per-body uniforms and the two
//! instanced fields.

use anyhow::{Context, Result};
use orrery_engine::render::RenderTarget;
use orrery_engine::render::instance::{
    InstanceBinding, InstanceBuffer, InstanceBufferError, InstanceSource, StageOutcome, instance_layout,
};
use orrery_engine::render::mesh::{MeshVertex, Model};
use orrery_engine::render::program::{
    CameraUniform, Layouts, ModelUniform, ProgramDesc, UniformBinding, create_pipeline,
};

use crate::camera::Camera;
use crate::config::{ProjectionConfig, SceneConfig};
use crate::transform::{OrbitingBody, ScatterField};

// ── bodies ────────────────────────────────────────────────────────────────

/// A non-instanced body with its own model uniform.
struct Body {
    config: OrbitingBody,
    model: Model,
    texture: wgpu::BindGroup,
    uniform: UniformBinding,
}

impl Body {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &Layouts,
        scene: &SceneConfig,
        config: &OrbitingBody,
    ) -> Self {
        let source = scene.model_source(&config.model);
        let model = Model::load(device, queue, &config.name, &source);
        let texture = layouts.texture_bind_group(device, &config.name, &model.diffuse);
        let uniform = UniformBinding::new(
            device,
            &layouts.model,
            &format!("{} model ubo", config.name),
            &ModelUniform::from(config.transform_at(0.0)),
        );

        Self {
            config: config.clone(),
            model,
            texture,
            uniform,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.texture, &[]);
        pass.set_bind_group(2, &self.uniform.bind_group, &[]);
        for mesh in &self.model.meshes {
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

// ── fields ────────────────────────────────────────────────────────────────

/// A scattered field drawn with one instanced call per sub-mesh.
struct Field {
    name: &'static str,
    config: ScatterField,
    model: Model,
    texture: wgpu::BindGroup,
    buffer: InstanceBuffer,
    binding: InstanceBinding,
}

impl Field {
    fn new(
        device: &wgpu::Device,
        layouts: &Layouts,
        name: &'static str,
        config: &ScatterField,
        model: Model,
    ) -> Self {
        let texture = layouts.texture_bind_group(device, name, &model.diffuse);
        Self {
            name,
            config: config.clone(),
            model,
            texture,
            buffer: InstanceBuffer::new(format!("{name} instances")),
            binding: InstanceBinding::new(),
        }
    }

    /// Regenerates and uploads the transforms, re-binding after a reallocation.
    fn refresh(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        elapsed: f32,
    ) -> Result<StageOutcome, InstanceBufferError> {
        let Self { name, config, model, buffer, binding, .. } = self;

        let outcome = buffer.update(device, queue, config.instance_count, |out| {
            config.generate(elapsed, out)
        })?;
        if outcome == StageOutcome::Reallocated {
            binding.bind(&*model, &*buffer);
            log::debug!(
                "{}: bound {} sub-mesh(es) of '{}' to generation {} ({} bytes)",
                name,
                model.meshes.len(),
                model.name,
                buffer.generation(),
                buffer.byte_len()
            );
        }
        Ok(outcome)
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.texture, &[]);
        if let Err(e) = self.binding.record(pass, &self.model, &self.buffer) {
            log::error!("{}: {e}", self.name);
        }
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

pub struct SolarRenderer {
    body_pipeline: wgpu::RenderPipeline,
    instanced_pipeline: wgpu::RenderPipeline,

    camera: UniformBinding,
    projection: ProjectionConfig,

    sun: Body,
    planets: Vec<Body>,

    asteroids: Field,
    stars: Field,
}

impl SolarRenderer {
    /// Loads every model, builds both programs and uploads the static star field.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        scene: &SceneConfig,
    ) -> Result<Self> {
        let layouts = Layouts::new(device);

        let body_pipeline = create_pipeline(
            device,
            &ProgramDesc {
                label: "orrery body pipeline",
                wgsl: include_str!("shaders/planet.wgsl"),
                buffers: &[MeshVertex::layout()],
                bind_group_layouts: &[&layouts.camera, &layouts.texture, &layouts.model],
                color_format: surface_format,
            },
        );
        let instanced_pipeline = create_pipeline(
            device,
            &ProgramDesc {
                label: "orrery instanced pipeline",
                wgsl: include_str!("shaders/asteroid.wgsl"),
                buffers: &[MeshVertex::layout(), instance_layout()],
                bind_group_layouts: &[&layouts.camera, &layouts.texture],
                color_format: surface_format,
            },
        );

        let camera = UniformBinding::new(
            device,
            &layouts.camera,
            "orrery camera ubo",
            &CameraUniform::new(glam::Mat4::IDENTITY, glam::Mat4::IDENTITY),
        );

        let sun = Body::new(device, queue, &layouts, scene, &scene.sun);
        let planets = scene
            .planets
            .iter()
            .map(|p| Body::new(device, queue, &layouts, scene, p))
            .collect();

        let rock = Model::load(device, queue, "asteroid", &scene.model_source(&scene.asteroid_model));
        let asteroids = Field::new(device, &layouts, "asteroids", &scene.asteroids, rock);

        let star = Model::load(device, queue, "star", &scene.model_source(&scene.star_model));
        let mut stars = Field::new(device, &layouts, "stars", &scene.stars, star);
        stars
            .refresh(device, queue, 0.0)
            .context("failed to upload star field")?;

        log::info!(
            "scene ready: sun + {} planets, {} asteroids, {} stars",
            scene.planets.len(),
            scene.asteroids.instance_count,
            stars.buffer.count(),
        );

        Ok(Self {
            body_pipeline,
            instanced_pipeline,
            camera,
            projection: scene.projection,
            sun,
            planets,
            asteroids,
            stars,
        })
    }

    /// Writes this frame's uniforms and asteroid transforms.
    ///
    /// Must run before the frame's command buffer is submitted. An error means
    /// the frame should be skipped.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        aspect: f32,
        elapsed: f32,
    ) -> Result<()> {
        let projection = camera.projection(aspect, self.projection.near, self.projection.far);
        self.camera
            .write(queue, &CameraUniform::new(projection, camera.view_matrix()));

        for body in std::iter::once(&self.sun).chain(&self.planets) {
            let model = ModelUniform::from(body.config.transform_at(elapsed));
            body.uniform.write(queue, &model);
        }

        self.asteroids
            .refresh(device, queue, elapsed)
            .context("asteroid upload failed")?;

        for field in [&self.asteroids, &self.stars] {
            field
                .binding
                .draws(&field.model, &field.buffer)
                .with_context(|| format!("{} not ready to draw", field.name))?;
        }
        Ok(())
    }

    /// Records the scene into one pass over the cleared target.
    pub fn draw(&self, target: &mut RenderTarget<'_>) {
        let mut pass = target.begin_load_pass("orrery scene pass");

        pass.set_pipeline(&self.body_pipeline);
        pass.set_bind_group(0, &self.camera.bind_group, &[]);
        self.sun.draw(&mut pass);
        for planet in &self.planets {
            planet.draw(&mut pass);
        }

        pass.set_pipeline(&self.instanced_pipeline);
        pass.set_bind_group(0, &self.camera.bind_group, &[]);
        self.asteroids.draw(&mut pass);
        self.stars.draw(&mut pass);
    }
}
