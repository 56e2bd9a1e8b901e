mod canvas;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use canvas::CanvasState;

use crate::color::{Rgb, Rgba};
use crate::error::GpuError;
use crate::shader::{overlay_source, points_source, FrameUniforms};

/// Everything queued for one frame, consumed by [`GpuState::render`].
#[derive(Debug, Clone)]
pub struct FrameCommands {
    pub overlay: Option<Rgba>,
    pub points: Vec<[f32; 2]>,
    pub point_color: Rgb,
}

impl FrameCommands {
    pub fn with_capacity(points: usize) -> Self {
        Self {
            overlay: None,
            points: Vec::with_capacity(points),
            point_color: Rgb::WHITE,
        }
    }

    /// Forget this frame's commands, keeping the allocation.
    pub fn clear(&mut self) {
        self.overlay = None;
        self.points.clear();
    }
}

impl Default for FrameCommands {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    overlay_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    point_buffer: wgpu::Buffer,
    point_capacity: usize,
    /// Largest point count a single vertex buffer can hold on this device.
    max_points: usize,
    canvas: CanvasState,
}

impl GpuState {
    /// Set up the surface at `size`, which should be the final fullscreen size.
    pub async fn new(
        window: Arc<Window>,
        size: PhysicalSize<u32>,
        point_capacity: usize,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Colors are plain 8-bit values, so blend in a non-sRGB format.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let canvas = CanvasState::new(&device, config.width, config.height, surface_format);

        let uniforms = FrameUniforms {
            screen_size: [config.width as f32, config.height as f32],
            _padding: [0.0; 2],
            overlay: [0.0; 4],
            point_color: Rgb::WHITE.to_array(),
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Frame Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let overlay_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            "Overlay",
            &overlay_source(),
            &[],
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            surface_format,
        );

        let point_attributes = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2, // pixel position
        }];
        let point_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            "Points",
            &points_source(),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &point_attributes,
            }],
            wgpu::PrimitiveTopology::PointList,
            Some(wgpu::BlendState::REPLACE),
            surface_format,
        );

        let max_points = points_per_buffer(device.limits().max_buffer_size);
        if point_capacity > max_points {
            log::warn!(
                "{} particles exceed the GPU buffer limit; only {} will be drawn",
                point_capacity,
                max_points
            );
        }
        let point_capacity = clamp_point_capacity(point_capacity, max_points);
        let point_buffer = create_point_buffer(&device, point_capacity);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            overlay_pipeline,
            point_pipeline,
            uniform_buffer,
            uniform_bind_group,
            point_buffer,
            point_capacity,
            max_points,
            canvas,
        })
    }

    /// Reconfigure for a new size. Zero or unchanged sizes are ignored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (width, height) = (new_size.width, new_size.height);
        if width == 0 || height == 0 || self.size() == (width, height) {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.canvas
            .resize(&self.device, width, height, self.config.format);
    }

    /// Drawable size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Fade, draw and present one frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, frame: &FrameCommands) -> Result<(), GpuError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(GpuError::OutOfMemory),
            Err(e) => {
                log::warn!("Skipping frame: {:?}", e);
                return Ok(());
            }
        };

        let uniforms = FrameUniforms {
            screen_size: [self.config.width as f32, self.config.height as f32],
            _padding: [0.0; 2],
            overlay: frame.overlay.map(Rgba::to_array).unwrap_or([0.0; 4]),
            point_color: frame.point_color.to_array(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        // Points past the device limit are not drawn.
        let points = &frame.points[..frame.points.len().min(self.max_points)];
        if points.len() > self.point_capacity {
            self.point_capacity =
                clamp_point_capacity(points.len().next_power_of_two(), self.max_points);
            self.point_buffer = create_point_buffer(&self.device, self.point_capacity);
        }
        if !points.is_empty() {
            self.queue
                .write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(points));
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Canvas pass: keep last frame, veil it, then draw particles on top
        {
            let load = self.canvas.take_load_op();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.canvas.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if frame.overlay.is_some() {
                pass.set_pipeline(&self.overlay_pipeline);
                pass.draw(0..3, 0..1);
            }

            if !points.is_empty() {
                let count = points.len() as u32;
                pass.set_pipeline(&self.point_pipeline);
                pass.set_vertex_buffer(0, self.point_buffer.slice(..));
                pass.draw(0..count, 0..1);
            }
        }

        // Blit pass
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.canvas.blit_pipeline);
            pass.set_bind_group(0, &self.canvas.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    name: &str,
    source: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    blend: Option<wgpu::BlendState>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{name} Shader")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{name} Pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

const POINT_SIZE: u64 = std::mem::size_of::<[f32; 2]>() as u64;

/// How many pixel positions fit in a buffer of `max_buffer_size` bytes.
fn points_per_buffer(max_buffer_size: u64) -> usize {
    usize::try_from(max_buffer_size / POINT_SIZE).unwrap_or(usize::MAX)
}

/// Buffer capacity for `requested` points: at least one, at most `max_points`.
fn clamp_point_capacity(requested: usize, max_points: usize) -> usize {
    requested.min(max_points).max(1)
}

fn create_point_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Point Buffer"),
        size: capacity as wgpu::BufferAddress * POINT_SIZE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
